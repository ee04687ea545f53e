//! Candidate sources: curated rules and LLM-backed ranking.
//!
//! Which source a deployment uses is decided once at startup, from
//! configuration. The resolver itself never branches on ranking
//! availability; it consumes whatever list its source produced.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use lodestar_llm::traits::LlmClient;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::candidate::{Candidate, CandidateList, SelectorKind};
use crate::dom::DocumentDigest;
use crate::rules;

/// Produces an ordered candidate list for an element description.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Never fails: sources degrade internally rather than surface errors,
    /// so resolution always has a list to walk (possibly an empty one).
    async fn generate(
        &self,
        description: &str,
        digest: Option<&DocumentDigest>,
    ) -> CandidateList;
}

/// Curated keyword rules only. The default source when no ranker is
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSource;

#[async_trait]
impl CandidateSource for RuleSource {
    async fn generate(
        &self,
        description: &str,
        _digest: Option<&DocumentDigest>,
    ) -> CandidateList {
        rules::candidates_for(description)
    }
}

/// LLM-backed source that proposes selectors against a document digest.
///
/// Any failure along the way, from a network error to malformed output to a
/// slow model, degrades silently to [`RuleSource`] behavior. Resolution is
/// never blocked on the model being healthy.
pub struct RankedSource {
    llm: Arc<dyn LlmClient + Send + Sync>,
    max_candidates: usize,
    request_timeout: Duration,
}

impl RankedSource {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            llm,
            max_candidates: 5,
            request_timeout: Duration::from_secs(8),
        }
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn rank(
        &self,
        description: &str,
        digest: Option<&DocumentDigest>,
    ) -> anyhow::Result<CandidateList> {
        let prompt = build_ranking_prompt(description, digest, self.max_candidates);
        let response = tokio::time::timeout(
            self.request_timeout,
            self.llm
                .generate(&prompt, Some(RANKING_SYSTEM_PROMPT), Some(600), Some(0.0)),
        )
        .await
        .map_err(|_| {
            anyhow!(
                "ranking request exceeded {}ms",
                self.request_timeout.as_millis()
            )
        })??;

        parse_ranked(&response.text, self.max_candidates)
    }
}

#[async_trait]
impl CandidateSource for RankedSource {
    async fn generate(
        &self,
        description: &str,
        digest: Option<&DocumentDigest>,
    ) -> CandidateList {
        match self.rank(description, digest).await {
            Ok(list) => {
                debug!(
                    target: "locate.ranker",
                    model = self.llm.model_name(),
                    count = list.len(),
                    %description,
                    "ranked candidates ready"
                );
                list
            }
            Err(e) => {
                warn!(
                    target: "locate.ranker",
                    model = self.llm.model_name(),
                    %description,
                    error = %e,
                    "ranking failed; degrading to rule-based candidates"
                );
                rules::candidates_for(description)
            }
        }
    }
}

const RANKING_SYSTEM_PROMPT: &str = "You are an expert at locating elements in HTML documents. \
Given a short description of a UI element and a structural summary of the live document, \
propose CSS selectors that locate it. Return only strict JSON in the shape the user prompt specifies.";

fn build_ranking_prompt(
    description: &str,
    digest: Option<&DocumentDigest>,
    max: usize,
) -> String {
    let digest_block = digest
        .map(DocumentDigest::render)
        .filter(|rendered| !rendered.is_empty())
        .unwrap_or_else(|| "(no document summary available)".to_string());

    format!(
        r#"Return STRICT JSON ONLY, matching exactly this shape:

{{
  "selectors": [
    {{
      "selector": "<CSS selector string>",
      "confidence": <integer 0-100>,
      "reasoning": "<one short sentence>",
      "kind": "attribute" | "id" | "text" | "structural"
    }}
  ]
}}

Rules:
- Propose at most {max} selectors, strongest first.
- Prefer stable semantic attributes (type, name, autocomplete, role) over ids, and ids over classes or positions.
- Every selector must plausibly match the element in the document summarized below.
- Do not include any other properties or text.

ELEMENT: {description}

DOCUMENT CONTROLS:
{digest_block}"#
    )
}

/// Pull a JSON object out of model output that may wrap it in code fences or
/// prose.
fn extract_json_block(text: &str) -> Option<String> {
    let fenced = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").ok()?;
    if let Some(caps) = fenced.captures(text) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    let plain = Regex::new(r"(?s)(\{.*\})").ok()?;
    plain
        .captures(text)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}

#[derive(Debug, Deserialize)]
struct RankedSelectorsWire {
    #[serde(default, alias = "candidates")]
    selectors: Vec<RankedEntryWire>,
}

#[derive(Debug, Deserialize)]
struct RankedEntryWire {
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default, alias = "type")]
    kind: Option<String>,
}

/// Parse ranker output into a confidence-ordered list.
///
/// Entries missing a selector or confidence are discarded; anything that
/// leaves the whole output unusable is an error, which the caller turns into
/// rule-based degradation.
fn parse_ranked(text: &str, max: usize) -> anyhow::Result<CandidateList> {
    let text = text.trim();
    if text.is_empty() {
        bail!("ranker returned empty output");
    }

    let json = extract_json_block(text).unwrap_or_else(|| text.to_string());
    let wire: RankedSelectorsWire = serde_json::from_str(&json)
        .map_err(|e| anyhow!("ranker returned malformed JSON: {e}"))?;

    let mut ranked: Vec<Candidate> = wire
        .selectors
        .into_iter()
        .filter_map(|entry| {
            let selector = entry.selector.filter(|s| !s.trim().is_empty())?;
            let confidence = entry.confidence?;
            Some(Candidate {
                selector,
                confidence: Some(confidence.clamp(0.0, 100.0).round() as u8),
                reasoning: entry.reasoning,
                kind: entry.kind.as_deref().and_then(SelectorKind::parse),
            })
        })
        .collect();

    if ranked.is_empty() {
        bail!("ranker output contained no usable selectors");
    }

    // Highest confidence first; this order becomes the probe order.
    ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    ranked.truncate(max);

    Ok(CandidateList::new(ranked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let text = "Here you go:\n```json\n{\"selectors\": []}\n```\nHope that helps!";
        assert_eq!(extract_json_block(text).as_deref(), Some("{\"selectors\": []}"));
    }

    #[test]
    fn extracts_bare_json_from_prose() {
        let text = "Sure! {\"selectors\": [{\"selector\": \"#a\", \"confidence\": 10}]} Done.";
        let block = extract_json_block(text).unwrap();
        assert!(block.starts_with('{') && block.ends_with('}'));
    }

    #[test]
    fn parse_sorts_by_confidence_and_truncates() {
        let text = r#"{"selectors": [
            {"selector": ".low", "confidence": 20},
            {"selector": ".high", "confidence": 95, "kind": "attribute"},
            {"selector": ".mid", "confidence": 60},
            {"selector": ".lower", "confidence": 10}
        ]}"#;
        let list = parse_ranked(text, 3).unwrap();
        assert_eq!(list.selectors(), vec![".high", ".mid", ".low"]);
        assert_eq!(list.iter().next().unwrap().kind, Some(SelectorKind::Attribute));
    }

    #[test]
    fn parse_discards_incomplete_entries() {
        let text = r#"{"selectors": [
            {"selector": "", "confidence": 90},
            {"confidence": 80},
            {"selector": ".keep", "confidence": 70},
            {"selector": ".no-score", "reasoning": "looks right"}
        ]}"#;
        let list = parse_ranked(text, 5).unwrap();
        assert_eq!(list.selectors(), vec![".keep"]);
    }

    #[test]
    fn parse_clamps_out_of_range_confidence() {
        let text = r#"{"selectors": [{"selector": ".x", "confidence": 640}]}"#;
        let list = parse_ranked(text, 5).unwrap();
        assert_eq!(list.iter().next().unwrap().confidence, Some(100));
    }

    #[test]
    fn parse_tolerates_unknown_kind_labels() {
        let text = r#"{"selectors": [{"selector": ".x", "confidence": 50, "kind": "mystery"}]}"#;
        let list = parse_ranked(text, 5).unwrap();
        assert_eq!(list.iter().next().unwrap().kind, None);
    }

    #[test]
    fn parse_rejects_unusable_output() {
        assert!(parse_ranked("", 5).is_err());
        assert!(parse_ranked("I could not find anything.", 5).is_err());
        assert!(parse_ranked(r#"{"selectors": []}"#, 5).is_err());
        assert!(parse_ranked(r#"{"selectors": [{"reasoning": "hm"}]}"#, 5).is_err());
    }

    #[test]
    fn prompt_carries_description_and_digest() {
        let digest = DocumentDigest {
            forms: vec![crate::dom::FormDigest {
                id: Some("loginForm".to_string()),
                controls: vec![crate::dom::ControlDigest {
                    tag: "input".to_string(),
                    control_type: Some("email".to_string()),
                    ..Default::default()
                }],
            }],
        };
        let prompt = build_ranking_prompt("email input", Some(&digest), 5);
        assert!(prompt.contains("ELEMENT: email input"));
        assert!(prompt.contains("form[0] id=loginForm"));
        assert!(prompt.contains("at most 5 selectors"));

        let bare = build_ranking_prompt("email input", None, 5);
        assert!(bare.contains("(no document summary available)"));
    }
}
