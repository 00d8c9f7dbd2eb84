// Background observation of URL streams.

mod helpers;

use std::sync::Arc;

use futures::stream;

use helpers::{checker_with, mock_classifier, phishing_verdict, StubSignals};
use pikephish::{observe_urls, CheckSource, ObservationSummary};

fn lines(items: &[&str]) -> impl futures::Stream<Item = String> + Unpin {
    stream::iter(items.iter().map(|s| s.to_string()).collect::<Vec<_>>())
}

#[tokio::test]
async fn test_observe_skips_non_urls_and_records_background_checks() {
    let (_server, classifier) = mock_classifier(2, phishing_verdict());
    let checker = Arc::new(checker_with(StubSignals::serving("<p>hi</p>"), classifier, 15).await);

    let summary = observe_urls(
        Arc::clone(&checker),
        lines(&[
            "https://one.example/login",
            "just some copied text",
            "",
            "http://two.example",
            "ftp://files.example",
        ]),
        4,
    )
    .await;

    assert_eq!(
        summary,
        ObservationSummary {
            observed: 2,
            skipped: 3,
            phishing: 2,
            failed: 0,
        }
    );

    let rows = checker.store().all().await.expect("snapshot");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.source == CheckSource::Background));
}

#[tokio::test]
async fn test_observe_repeated_url_is_served_from_cache() {
    let (_server, classifier) = mock_classifier(1, phishing_verdict());
    let checker = Arc::new(checker_with(StubSignals::serving("<p>hi</p>"), classifier, 15).await);

    // Concurrency of one keeps the second check behind the first write
    let summary = observe_urls(
        Arc::clone(&checker),
        lines(&["https://repeat.example", "https://repeat.example/other"]),
        1,
    )
    .await;

    assert_eq!(summary.observed, 2);
    assert_eq!(summary.phishing, 2);
    assert_eq!(checker.store().count().await.expect("count"), 1);
}

#[tokio::test]
async fn test_observe_counts_classifier_failures() {
    let server = httptest::Server::run();
    server.expect(
        httptest::Expectation::matching(httptest::matchers::request::method_path(
            "POST", "/predict",
        ))
        .times(2)
        .respond_with(httptest::responders::status_code(503)),
    );
    let classifier = helpers::classifier_for(&server);
    let checker = Arc::new(checker_with(StubSignals::serving("<p>hi</p>"), classifier, 15).await);

    let summary = observe_urls(
        Arc::clone(&checker),
        lines(&["https://a.example", "https://b.example"]),
        2,
    )
    .await;

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.phishing, 0);
    assert_eq!(checker.store().count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_observe_empty_stream() {
    let (_server, classifier) = mock_classifier(0, phishing_verdict());
    let checker = Arc::new(checker_with(StubSignals::serving(""), classifier, 15).await);

    let summary = observe_urls(checker, lines(&[]), 8).await;
    assert_eq!(summary, ObservationSummary::default());
}
