/// Runs `reset` when dropped unless [`ResetOnDrop::disarm`] was called first.
///
/// Each channel arms one across its network await so a dropped future cannot
/// leave the channel marked busy.
pub(crate) struct ResetOnDrop<F: FnOnce()> {
    reset: Option<F>,
}

impl<F: FnOnce()> ResetOnDrop<F> {
    pub(crate) fn new(reset: F) -> Self {
        Self { reset: Some(reset) }
    }

    pub(crate) fn disarm(mut self) {
        self.reset = None;
    }
}

impl<F: FnOnce()> Drop for ResetOnDrop<F> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset();
        }
    }
}
