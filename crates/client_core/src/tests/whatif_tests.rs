use super::*;
use crate::test_support::ScriptedTransport;

fn channel(transport: Arc<ScriptedTransport>) -> WhatIfChannel<ScriptedTransport> {
    let (events, _) = broadcast::channel(16);
    WhatIfChannel::new(transport, events)
}

fn answered(outcome: AskOutcome) -> WhatIfExchange {
    match outcome {
        AskOutcome::Answered(exchange) => exchange,
        AskOutcome::Busy => panic!("unexpected busy outcome"),
    }
}

#[tokio::test]
async fn blank_queries_never_reach_the_transport() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));

    for query in ["", "   ", "\n\t"] {
        let err = what_if.ask(query).await.expect_err("blank query");
        assert_eq!(err, ValidationError::EmptyQuery);
    }
    assert_eq!(transport.call_count(), 0);
    assert!(what_if.current().await.is_none());
}

#[tokio::test]
async fn answer_is_cached_as_current_exchange() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));
    transport.push_body(Endpoint::WhatIf, r#"{"response":"The tenant may terminate with notice."}"#);

    let exchange = answered(what_if.ask("  What if the tenant leaves early? ").await.expect("ask"));

    assert_eq!(exchange.query, "What if the tenant leaves early?");
    assert_eq!(
        exchange.response,
        WhatIfResponse::Answer("The tenant may terminate with notice.".into())
    );
    assert_eq!(what_if.current().await, Some(exchange));
    assert!(!what_if.is_asking().await);

    let calls = transport.calls();
    assert_eq!(calls[0].0, Endpoint::WhatIf);
    assert_eq!(
        calls[0].1.text_value(fields::QUERY),
        Some("What if the tenant leaves early?")
    );
}

#[tokio::test]
async fn service_error_key_becomes_failed_exchange() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));
    transport.push_body(Endpoint::WhatIf, r#"{"error":"No document analyzed yet."}"#);

    let exchange = answered(what_if.ask("What if?").await.expect("ask"));
    assert_eq!(
        exchange.response,
        WhatIfResponse::Failed("No document analyzed yet.".into())
    );
}

#[tokio::test]
async fn transport_failure_becomes_failed_exchange() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));
    transport.push_status(Endpoint::WhatIf, 502, "bad gateway");

    let exchange = answered(what_if.ask("What if?").await.expect("ask"));
    match exchange.response {
        WhatIfResponse::Failed(message) => assert!(message.contains("502")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!what_if.is_asking().await);
}

#[tokio::test]
async fn unreadable_or_empty_reply_becomes_failed_exchange() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));
    transport.push_body(Endpoint::WhatIf, "not json");
    transport.push_body(Endpoint::WhatIf, "{}");

    let first = answered(what_if.ask("one").await.expect("ask"));
    let second = answered(what_if.ask("two").await.expect("ask"));
    assert!(matches!(first.response, WhatIfResponse::Failed(_)));
    assert!(matches!(second.response, WhatIfResponse::Failed(_)));
}

#[tokio::test]
async fn new_exchange_replaces_previous_wholesale() {
    let transport = ScriptedTransport::new();
    let what_if = channel(Arc::clone(&transport));
    transport.push_body(Endpoint::WhatIf, r#"{"response":"first"}"#);
    transport.push_body(Endpoint::WhatIf, r#"{"error":"second failed"}"#);

    what_if.ask("q1").await.expect("ask");
    what_if.ask("q2").await.expect("ask");

    assert_eq!(
        what_if.current().await,
        Some(WhatIfExchange {
            query: "q2".into(),
            response: WhatIfResponse::Failed("second failed".into()),
        })
    );

    what_if.dismiss().await;
    assert!(what_if.current().await.is_none());
}

#[tokio::test]
async fn second_question_while_asking_is_ignored() {
    let (transport, gate) = ScriptedTransport::gated();
    let what_if = Arc::new(channel(Arc::clone(&transport)));
    transport.push_body(Endpoint::WhatIf, r#"{"response":"answer"}"#);

    let first = tokio::spawn({
        let what_if = Arc::clone(&what_if);
        async move { what_if.ask("first").await }
    });
    gate.entered.notified().await;
    assert!(what_if.is_asking().await);

    let second = what_if.ask("second").await.expect("busy is not an error");
    assert_eq!(second, AskOutcome::Busy);
    assert_eq!(transport.call_count(), 1);

    gate.release.notify_one();
    let exchange = answered(first.await.expect("join").expect("ask"));
    assert_eq!(exchange.query, "first");
}

#[tokio::test]
async fn dropped_question_frees_the_channel() {
    let (transport, gate) = ScriptedTransport::gated();
    let what_if = channel(Arc::clone(&transport));

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        what_if.ask("What if the landlord sells?"),
    )
    .await;
    assert!(timed_out.is_err(), "held question should not complete");
    assert!(!what_if.is_asking().await);

    transport.push_body(Endpoint::WhatIf, r#"{"response":"The lease survives the sale."}"#);
    gate.release.notify_one();
    let exchange = answered(what_if.ask("What if the landlord sells?").await.expect("ask"));
    assert_eq!(
        exchange.response,
        WhatIfResponse::Answer("The lease survives the sale.".into())
    );
    assert_eq!(transport.call_count(), 2);
}
