use super::*;
use crate::testing::{EchoEndpoint, MockTransport, Reply};
use core::time::Duration;

fn numbered(n: usize) -> Vec<Query> {
    (0..n)
        .map(|i| {
            Query::builder("{i}")
                .param("i", i.to_string())
                .build()
                .unwrap()
        })
        .collect()
}

fn dispatcher(
    transport: &MockTransport,
    max_concurrency: usize,
    cache_results: bool,
) -> Dispatcher<EchoEndpoint, MockTransport> {
    let config = DispatcherConfig::new(max_concurrency, cache_results).unwrap();
    Dispatcher::new(EchoEndpoint, transport.clone(), config).unwrap()
}

fn index_of(uri: &str) -> u64 {
    uri.parse().unwrap()
}

#[tokio::test]
async fn output_follows_batch_order_not_completion_order() {
    let n = 8;
    let transport = MockTransport::new(move |request| {
        let delay = (n - index_of(&request.uri)) * 5;
        Reply::ok(request.uri.clone()).after(Duration::from_millis(delay))
    });
    let mut dispatcher = dispatcher(&transport, 8, true);
    let batch = numbered(8);

    let results = dispatcher.execute(&batch).await.unwrap();

    assert_eq!(results.len(), batch.len());
    for ((query, payload), expected) in results.iter().zip(&batch) {
        assert_eq!(query, expected);
        assert_eq!(payload.as_ref(), expected.as_str().as_bytes());
    }
}

#[tokio::test]
async fn cached_batch_makes_no_further_calls() {
    let transport = MockTransport::echo();
    let mut dispatcher = dispatcher(&transport, 4, true);
    let batch = numbered(6);

    let first = dispatcher.execute(&batch).await.unwrap();
    assert_eq!(transport.calls(), 6);
    assert_eq!(dispatcher.cache().len(), 6);

    let second = dispatcher.execute(&batch).await.unwrap();
    assert_eq!(transport.calls(), 6);
    assert_eq!(first, second);
}

#[tokio::test]
async fn uncached_batch_repeats_every_call() {
    let transport = MockTransport::echo();
    let mut dispatcher = dispatcher(&transport, 4, false);
    let batch = numbered(6);

    dispatcher.execute(&batch).await.unwrap();
    dispatcher.execute(&batch).await.unwrap();
    assert_eq!(transport.calls(), 12);
    assert!(dispatcher.cache().is_empty());
}

#[tokio::test]
async fn partially_cached_batch_fetches_only_misses() {
    let transport = MockTransport::echo();
    let mut dispatcher = dispatcher(&transport, 4, true);
    let batch = numbered(6);

    dispatcher.execute(&batch[..3]).await.unwrap();
    assert_eq!(transport.calls(), 3);

    let results = dispatcher.execute(&batch).await.unwrap();
    assert_eq!(transport.calls(), 6);
    assert_eq!(results.len(), 6);
    assert_eq!(dispatcher.cache().len(), 6);
}

#[tokio::test]
async fn one_failure_fails_the_batch_and_caches_nothing() {
    let transport = MockTransport::new(|request| {
        if request.uri == "0" {
            Reply::status(500, "boom")
        } else {
            Reply::ok(request.uri.clone()).after(Duration::from_millis(20))
        }
    });
    let mut dispatcher = dispatcher(&transport, 3, true);
    let batch = numbered(10);

    let err = dispatcher.execute(&batch).await.unwrap_err();

    assert_eq!(
        err,
        Error::EndpointInternalError {
            body: "boom".to_string()
        }
    );
    // Queries still waiting on the gate were dropped, never sent.
    assert!(transport.calls() < batch.len());
    assert!(dispatcher.cache().is_empty());
    assert_eq!(transport.live_sessions(), 0);
}

#[tokio::test]
async fn connection_failure_fails_the_batch_and_caches_nothing() {
    let transport = MockTransport::new(|request| {
        if request.uri == "2" {
            Reply::fail("connection reset")
        } else {
            Reply::ok(request.uri.clone())
        }
    });
    let mut dispatcher = dispatcher(&transport, 2, true);

    let err = dispatcher.execute(&numbered(5)).await.unwrap_err();

    assert_eq!(
        err,
        Error::Transport {
            status: None,
            reason: "connection reset".to_string()
        }
    );
    assert!(dispatcher.cache().is_empty());
    assert_eq!(transport.live_sessions(), 0);
}

#[tokio::test]
async fn connection_failure_of_a_single_query_is_not_cached() {
    let transport = MockTransport::new(|_| Reply::fail("refused"));
    let mut dispatcher = dispatcher(&transport, 2, true);

    let err = dispatcher.execute(&numbered(1)).await.unwrap_err();

    assert!(matches!(err, Error::Transport { status: None, .. }));
    assert!(dispatcher.cache().is_empty());
    assert_eq!(transport.live_sessions(), 0);
}

#[tokio::test]
async fn status_codes_surface_as_typed_errors() {
    let transport = MockTransport::new(|_| Reply::status(414, "too long"));
    let mut dispatcher = dispatcher(&transport, 2, true);

    let err = dispatcher.execute(&numbered(2)).await.unwrap_err();
    assert!(matches!(err, Error::UriTooLong { .. }));
}

#[tokio::test]
async fn in_flight_requests_never_exceed_the_limit() {
    let transport =
        MockTransport::new(|request| Reply::ok(request.uri.clone()).after(Duration::from_millis(10)));
    let mut dispatcher = dispatcher(&transport, 3, false);

    dispatcher.execute(&numbered(20)).await.unwrap();

    assert_eq!(transport.calls(), 20);
    assert_eq!(transport.peak_in_flight(), 3);
    assert_eq!(transport.live_sessions(), 0);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let transport = MockTransport::echo();
    let mut dispatcher = dispatcher(&transport, 3, true);

    assert_eq!(dispatcher.execute(&[]).await, Err(Error::EmptyBatch));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn single_query_uses_and_fills_the_cache() {
    let transport = MockTransport::echo();
    let mut dispatcher = dispatcher(&transport, 3, true);
    let batch = numbered(1);

    let first = dispatcher.execute(&batch).await.unwrap();
    let second = dispatcher.execute(&batch).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.live_sessions(), 0);
}

#[tokio::test]
async fn single_query_failure_is_not_cached() {
    let transport = MockTransport::new(|_| Reply::status(400, "bad"));
    let mut dispatcher = dispatcher(&transport, 3, true);

    let err = dispatcher.execute(&numbered(1)).await.unwrap_err();
    assert!(matches!(err, Error::QueryBadFormed { .. }));
    assert!(dispatcher.cache().is_empty());
}

#[test]
fn zero_concurrency_is_rejected() {
    assert!(matches!(
        DispatcherConfig::new(0, true),
        Err(Error::InvalidConfig { .. })
    ));

    let config = DispatcherConfig {
        max_concurrency: 0,
        cache_results: false,
    };
    assert!(Dispatcher::new(EchoEndpoint, MockTransport::echo(), config).is_err());
}
