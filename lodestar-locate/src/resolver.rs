//! Ordered-fallback resolution over a live document.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::candidate::CandidateList;
use crate::dom::DocumentQuery;

/// Timing knobs for [`Resolver`].
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Total wall-clock budget for one resolution call.
    pub budget: Duration,
    /// Ceiling on any single candidate's probe window.
    pub per_candidate_cap: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(10),
            per_candidate_cap: Duration::from_secs(2),
        }
    }
}

/// Terminal failure: every candidate was probed in order and none matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// Human description of the element sought, when one was given.
    pub description: Option<String>,
    /// Every selector probed, in the exact order attempted.
    pub attempted: Vec<String>,
}

impl std::fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = self.description.as_deref().unwrap_or("element");
        if self.attempted.is_empty() {
            write!(f, "could not resolve {what}: no candidate selectors were provided")
        } else {
            write!(
                f,
                "could not resolve {what}: attempted [{}] in order, none matched",
                self.attempted.join(", ")
            )
        }
    }
}

impl std::error::Error for ResolutionFailure {}

/// Probes candidates strictly in list order and returns the first match.
///
/// The resolver holds no document state and caches nothing between calls;
/// a stale page simply makes the next call walk the list again. Probe
/// failures of any kind (no match, adapter error, timeout) are logged and
/// skipped, never surfaced mid-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// Window for a single probe: an equal share of the budget, capped so a
    /// short list cannot hand one candidate the whole budget.
    fn probe_window(&self, candidate_count: usize) -> Duration {
        let share = self.settings.budget / candidate_count.max(1) as u32;
        share.min(self.settings.per_candidate_cap)
    }

    /// Walk `candidates` front to back, returning the first element found.
    ///
    /// `description` only decorates logs and the failure report. An empty
    /// list fails immediately with an empty attempted set.
    pub async fn resolve<D: DocumentQuery>(
        &self,
        doc: &D,
        candidates: &CandidateList,
        description: Option<&str>,
    ) -> Result<D::Element, ResolutionFailure> {
        let what = description.unwrap_or("element");
        if candidates.is_empty() {
            warn!(target: "locate.resolve", description = what, "no candidates to probe");
            return Err(ResolutionFailure {
                description: description.map(str::to_string),
                attempted: Vec::new(),
            });
        }

        let window = self.probe_window(candidates.len());
        let started = Instant::now();

        for (index, candidate) in candidates.iter().enumerate() {
            let selector = candidate.selector.as_str();
            debug!(
                target: "locate.resolve",
                %selector,
                index,
                window_ms = window.as_millis() as u64,
                "probing candidate"
            );

            // The outer timeout also bounds adapters that ignore the window
            // they are handed.
            match tokio::time::timeout(window, doc.wait_for(selector, window)).await {
                Ok(Ok(element)) => {
                    info!(
                        target: "locate.resolve",
                        %selector,
                        index,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        description = what,
                        "resolved"
                    );
                    return Ok(element);
                }
                Ok(Err(e)) => {
                    debug!(
                        target: "locate.resolve",
                        %selector,
                        index,
                        error = %e,
                        "probe failed; trying next candidate"
                    );
                }
                Err(_) => {
                    debug!(
                        target: "locate.resolve",
                        %selector,
                        index,
                        "probe timed out; trying next candidate"
                    );
                }
            }
        }

        let attempted = candidates.selectors();
        warn!(
            target: "locate.resolve",
            description = what,
            attempted = ?attempted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "all candidates exhausted"
        );
        Err(ResolutionFailure {
            description: description.map(str::to_string),
            attempted,
        })
    }
}
