//! History store tests.

use futures::StreamExt;

use super::*;
use crate::classifier::{ClassificationVerdict, VerdictLabel};
use crate::config::DuplicatePolicy;
use crate::error_handling::DatabaseError;
use crate::scan::{FeatureRecord, WebviewMisuse};

fn features(url: &str) -> FeatureRecord {
    FeatureRecord {
        url: url.to_string(),
        domain: url.split("://").nth(1).map(str::to_string),
        subdomain_count: Some(0),
        is_https: url.starts_with("https"),
        final_url: None,
        status_code: None,
        ssl: None,
        dns: None,
        html: None,
        webview_misuse: WebviewMisuse::Unlikely,
        collected_at: 0,
        scan_duration_ms: 0,
        errors: Vec::new(),
    }
}

fn verdict(is_phishing: bool, reason: Option<&str>) -> ClassificationVerdict {
    ClassificationVerdict {
        is_phishing,
        confidence: if is_phishing { 0.9 } else { 0.1 },
        label: if is_phishing {
            VerdictLabel::Phishing
        } else {
            VerdictLabel::Legitimate
        },
        reason: reason.map(str::to_string),
    }
}

async fn store() -> HistoryStore {
    HistoryStore::in_memory(DuplicatePolicy::Append)
        .await
        .expect("in-memory store")
}

#[tokio::test]
async fn test_lookup_miss() {
    let store = store().await;
    assert!(store.lookup("https://nothing.test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_then_lookup() {
    let store = store().await;
    let saved = store
        .record_success(
            &verdict(true, Some("lookalike domain")),
            &features("https://paypa1.test"),
            CheckSource::Manual,
            15,
        )
        .await
        .unwrap();

    let found = store.lookup("https://paypa1.test").await.unwrap().unwrap();
    assert_eq!(found, saved);
    assert_eq!(found.domain.as_deref(), Some("paypa1.test"));
    assert_eq!(found.prediction, VerdictLabel::Phishing);
    assert_eq!(found.source, CheckSource::Manual);
    assert_eq!(found.verdict(), verdict(true, Some("lookalike domain")));
    // Exact key match only
    assert!(store.lookup("http://paypa1.test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicates_are_appended_and_newest_wins() {
    let store = store().await;
    let url = "https://twice.test";
    store
        .record_success(&verdict(false, None), &features(url), CheckSource::Manual, 15)
        .await
        .unwrap();
    let second = store
        .record_success(&verdict(true, None), &features(url), CheckSource::Background, 15)
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);
    let found = store.lookup(url).await.unwrap().unwrap();
    assert_eq!(found.id, second.id);
    assert!(found.is_phishing);
}

#[tokio::test]
async fn test_replace_existing_policy_keeps_one_row_per_url() {
    let store = HistoryStore::in_memory(DuplicatePolicy::ReplaceExisting)
        .await
        .unwrap();
    let url = "https://once.test";
    for _ in 0..3 {
        store
            .record_success(&verdict(false, None), &features(url), CheckSource::Manual, 15)
            .await
            .unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_retention_keeps_newest_limit_rows() {
    let store = store().await;
    for i in 0..18 {
        store
            .record_success(
                &verdict(false, None),
                &features(&format!("https://site{i}.test")),
                CheckSource::Manual,
                15,
            )
            .await
            .unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 15);
    for i in 0..3 {
        let url = format!("https://site{i}.test");
        assert!(store.lookup(&url).await.unwrap().is_none(), "{url} kept");
    }
    let recent = store.recent(15).await.unwrap();
    assert_eq!(recent.first().map(|r| r.url.as_str()), Some("https://site17.test"));
    assert_eq!(recent.last().map(|r| r.url.as_str()), Some("https://site3.test"));
}

#[tokio::test]
async fn test_prune_delete_clear() {
    let store = store().await;
    let mut ids = Vec::new();
    for i in 0..5 {
        let saved = store
            .record_success(
                &verdict(false, None),
                &features(&format!("https://p{i}.test")),
                CheckSource::Manual,
                100,
            )
            .await
            .unwrap();
        ids.push(saved.id);
    }

    assert_eq!(store.prune(3).await.unwrap(), 2);
    assert_eq!(store.count().await.unwrap(), 3);

    assert!(store.delete(ids[4]).await.unwrap());
    assert!(!store.delete(ids[4]).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 2);

    assert_eq!(store.clear().await.unwrap(), 2);
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recent_links_is_live() {
    let store = store().await;
    let mut view = Box::pin(store.recent_links(2));

    let initial = view.next().await.unwrap().unwrap();
    assert!(initial.is_empty());

    store
        .record_success(&verdict(false, None), &features("https://a.test"), CheckSource::Manual, 15)
        .await
        .unwrap();
    let after_one = view.next().await.unwrap().unwrap();
    assert_eq!(after_one.len(), 1);

    store
        .record_success(&verdict(true, None), &features("https://b.test"), CheckSource::Manual, 15)
        .await
        .unwrap();
    store
        .record_success(&verdict(true, None), &features("https://c.test"), CheckSource::Manual, 15)
        .await
        .unwrap();
    let latest = view.next().await.unwrap().unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].url, "https://c.test");

    // Dropping a view has no effect on the store
    drop(view);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_all_links_ends_when_store_dropped() {
    let store = store().await;
    let mut view = Box::pin(store.all_links());
    assert!(view.next().await.unwrap().unwrap().is_empty());

    drop(store);
    assert!(view.next().await.is_none());
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");

    let store = HistoryStore::open(&path, DuplicatePolicy::Append).await.unwrap();
    store
        .record_success(&verdict(true, None), &features("https://kept.test"), CheckSource::Background, 15)
        .await
        .unwrap();
    store.close().await;

    let reopened = HistoryStore::open(&path, DuplicatePolicy::Append).await.unwrap();
    let found = reopened.lookup("https://kept.test").await.unwrap().unwrap();
    assert_eq!(found.source, CheckSource::Background);
    reopened.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_keep_newest_limit_rows() {
    const LIMIT: u32 = 15;
    const WRITERS: usize = 60;

    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(
        HistoryStore::open(&dir.path().join("history.db"), DuplicatePolicy::Append)
            .await
            .unwrap(),
    );

    let mut tasks = Vec::new();
    for i in 0..WRITERS {
        let store = std::sync::Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let url = format!("https://writer{i}.test");
            let saved = store
                .record_success(&verdict(i % 2 == 0, None), &features(&url), CheckSource::Background, LIMIT)
                .await?;
            if i % 10 == 0 {
                store.prune(LIMIT).await?;
            }
            // A later writer may already have pruned this row
            if let Some(found) = store.lookup(&url).await? {
                assert_eq!(found, saved);
            }
            let count = store.count().await?;
            assert!(count <= i64::from(LIMIT), "saw {count} rows");
            Ok::<_, DatabaseError>(saved)
        }));
    }

    let mut saved = Vec::new();
    for task in tasks {
        saved.push(task.await.expect("writer task").expect("writer succeeded"));
    }

    assert_eq!(store.count().await.unwrap(), i64::from(LIMIT));
    saved.sort_by_key(|r| std::cmp::Reverse((r.checked_at, r.id)));
    let expected: Vec<i64> = saved.iter().take(LIMIT as usize).map(|r| r.id).collect();
    let kept: Vec<i64> = store.all().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(kept, expected);
    store.close().await;
}

#[tokio::test]
async fn test_closed_store_rejects_operations() {
    let store = store().await;
    store.close().await;
    assert!(matches!(
        store.lookup("https://a.test").await,
        Err(DatabaseError::SqlError(_))
    ));
}

#[tokio::test]
async fn test_corrupt_prediction_is_reported() {
    let pool = init_db_pool_with_path(std::path::Path::new(IN_MEMORY_DB))
        .await
        .unwrap();
    let store = HistoryStore::from_pool(DbPool::clone(&pool), DuplicatePolicy::Append)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO link_history (url, domain, is_phishing, confidence, prediction, reason, checked_at, source)
         VALUES ('https://odd.test', NULL, 0, 0.5, 'maybe', NULL, 1, 'manual')",
    )
    .execute(pool.as_ref())
    .await
    .unwrap();

    let err = store.lookup("https://odd.test").await.unwrap_err();
    assert!(matches!(err, DatabaseError::CorruptRow { .. }));
}
