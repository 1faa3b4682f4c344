use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::protocol::{fields, Endpoint, WhatIfReply};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::ValidationError,
    guard::ResetOnDrop,
    transport::{FormPayload, RawPayload, Transport},
    ClientEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhatIfResponse {
    Answer(String),
    /// User-facing explanation of why no answer is available.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatIfExchange {
    pub query: String,
    pub response: WhatIfResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered(WhatIfExchange),
    Busy,
}

#[derive(Default)]
struct WhatIfState {
    asking: bool,
    current: Option<WhatIfExchange>,
}

pub struct WhatIfChannel<T: Transport> {
    transport: Arc<T>,
    state: Mutex<WhatIfState>,
    events: broadcast::Sender<ClientEvent>,
}

impl<T: Transport> WhatIfChannel<T> {
    pub fn new(transport: Arc<T>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            transport,
            state: Mutex::new(WhatIfState::default()),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, WhatIfState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn is_asking(&self) -> bool {
        self.state().asking
    }

    pub async fn current(&self) -> Option<WhatIfExchange> {
        self.state().current.clone()
    }

    pub async fn dismiss(&self) {
        self.state().current = None;
    }

    pub async fn ask(&self, query: &str) -> Result<AskOutcome, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        {
            let mut state = self.state();
            if state.asking {
                debug!("what-if already in flight; ignoring question");
                return Ok(AskOutcome::Busy);
            }
            state.asking = true;
        }

        info!(chars = query.len(), "asking what-if question");
        let form = FormPayload::new().text(fields::QUERY, query);
        let in_flight = ResetOnDrop::new(|| self.state().asking = false);
        let result = self.transport.submit(Endpoint::WhatIf, form).await;
        in_flight.disarm();
        let response = match result {
            Ok(raw) => interpret(&raw),
            Err(err) => {
                warn!(status = ?err.status(), "what-if request failed: {err}");
                WhatIfResponse::Failed(format!("The analysis service did not answer: {err}"))
            }
        };

        let exchange = WhatIfExchange {
            query: query.to_string(),
            response,
        };
        {
            let mut state = self.state();
            state.current = Some(exchange.clone());
            state.asking = false;
        }
        let _ = self
            .events
            .send(ClientEvent::WhatIfAnswered(exchange.clone()));
        Ok(AskOutcome::Answered(exchange))
    }
}

fn interpret(raw: &RawPayload) -> WhatIfResponse {
    match serde_json::from_str::<WhatIfReply>(raw.as_str()) {
        Ok(WhatIfReply {
            response: Some(answer),
            ..
        }) => WhatIfResponse::Answer(answer),
        Ok(WhatIfReply {
            error: Some(message),
            ..
        }) => WhatIfResponse::Failed(message),
        Ok(_) => WhatIfResponse::Failed("The service returned an empty answer.".to_string()),
        Err(err) => {
            warn!("undecodable what-if reply: {err}");
            WhatIfResponse::Failed("The service returned an unreadable answer.".to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/whatif_tests.rs"]
mod tests;
