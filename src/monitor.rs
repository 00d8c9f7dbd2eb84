//! Passive URL observation.
//!
//! Feeds URLs seen in the environment (clipboard, notifications, a log file)
//! through the same check entry point as manual checks, tagged
//! `CheckSource::Background`. Only phishing verdicts are surfaced; everything
//! else is logged at debug level.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use log::{debug, warn};

use crate::checker::{PhishingChecker, VerdictOrigin};
use crate::initialization::init_semaphore;
use crate::scan::SignalSource;
use crate::storage::CheckSource;

/// Counters for one observation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationSummary {
    /// Strings accepted as URLs and checked
    pub observed: usize,
    /// Strings rejected before checking
    pub skipped: usize,
    /// Checks that ended in a phishing verdict
    pub phishing: usize,
    /// Checks that ended in an error
    pub failed: usize,
}

impl ObservationSummary {
    fn tally(&mut self, joined: Result<Observed, tokio::task::JoinError>) {
        match joined {
            Ok(Observed::Phishing) => self.phishing += 1,
            Ok(Observed::Clean) => {}
            Ok(Observed::Failed) => self.failed += 1,
            Err(e) => {
                self.failed += 1;
                debug!("Background check task failed: {e}");
            }
        }
    }
}

/// Whether an observed string looks like a URL worth checking.
pub fn is_observable_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

enum Observed {
    Phishing,
    Clean,
    Failed,
}

/// Checks each observed URL as it arrives, with at most `max_concurrency`
/// checks in flight. Returns once `lines` ends and every check has finished.
pub async fn observe_urls<S, L>(
    checker: Arc<PhishingChecker<S>>,
    mut lines: L,
    max_concurrency: usize,
) -> ObservationSummary
where
    S: SignalSource + 'static,
    L: Stream<Item = String> + Unpin,
{
    let semaphore = init_semaphore(max_concurrency.max(1));
    let mut summary = ObservationSummary::default();
    let mut tasks = FuturesUnordered::new();

    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else { break };
                let text = line.trim().to_string();
                if !is_observable_url(&text) {
                    if !text.is_empty() {
                        debug!("Ignoring observed text that is not an http(s) URL");
                    }
                    summary.skipped += 1;
                    continue;
                }
                summary.observed += 1;

                let checker = Arc::clone(&checker);
                let semaphore = Arc::clone(&semaphore);
                tasks.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    check_in_background(&checker, &text).await
                }));
            }
            Some(joined) = tasks.next(), if !tasks.is_empty() => summary.tally(joined),
        }
    }

    while let Some(joined) = tasks.next().await {
        summary.tally(joined);
    }

    summary
}

async fn check_in_background<S: SignalSource>(checker: &PhishingChecker<S>, url: &str) -> Observed {
    match checker.check_url(url, CheckSource::Background).await {
        Ok(outcome) if outcome.verdict.is_phishing => {
            let cached = if outcome.origin == VerdictOrigin::Cache {
                " (cached)"
            } else {
                ""
            };
            warn!(
                "Phishing detected{cached}: {url} (confidence {:.2}{})",
                outcome.verdict.confidence,
                outcome
                    .verdict
                    .reason
                    .as_deref()
                    .map(|r| format!(", {r}"))
                    .unwrap_or_default()
            );
            Observed::Phishing
        }
        Ok(outcome) => {
            debug!("Background check of {url}: {}", outcome.verdict.label);
            Observed::Clean
        }
        Err(e) => {
            debug!("Background check of {url} failed: {e}");
            Observed::Failed
        }
    }
}
