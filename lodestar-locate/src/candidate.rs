//! Candidate selectors and the ordered lists the resolver walks.

use serde::{Deserialize, Serialize};

/// Broad shape of a selector. Carried for logging and ranking diagnostics,
/// never consulted during probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// Semantic attribute match, e.g. `input[type=email]`.
    Attribute,
    /// Id selector, e.g. `#email`.
    Id,
    /// Visible-text match, e.g. `text=Sign In`.
    Text,
    /// Class or positional guess, e.g. `form button`.
    Structural,
}

impl SelectorKind {
    /// Lenient parse for ranker output. Unknown labels map to `None` rather
    /// than failing the surrounding document.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "attribute" | "attr" => Some(Self::Attribute),
            "id" => Some(Self::Id),
            "text" => Some(Self::Text),
            "structural" | "class" | "position" => Some(Self::Structural),
            _ => None,
        }
    }
}

/// One selector the resolver may probe, in priority position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub selector: String,
    /// Ranker-assigned score, 0 to 100. Curated candidates carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SelectorKind>,
}

impl Candidate {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            confidence: None,
            reasoning: None,
            kind: None,
        }
    }

    pub fn with_kind(selector: impl Into<String>, kind: SelectorKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new(selector)
        }
    }
}

/// Ordered fallback sequence. Position encodes priority: the resolver probes
/// front to back and never reorders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList(Vec<Candidate>);

impl CandidateList {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self(candidates)
    }

    /// Build a list of bare selectors, preserving iteration order.
    pub fn from_selectors<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Candidate::new).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.0.push(candidate);
    }

    /// The selectors alone, in probe order. This is what failure reports and
    /// logs carry.
    pub fn selectors(&self) -> Vec<String> {
        self.0.iter().map(|c| c.selector.clone()).collect()
    }
}

impl IntoIterator for CandidateList {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_selectors_preserves_order() {
        let list = CandidateList::from_selectors([".a", ".b", ".c"]);
        assert_eq!(list.selectors(), vec![".a", ".b", ".c"]);
        assert!(list.iter().all(|c| c.confidence.is_none()));
    }

    #[test]
    fn kind_parse_accepts_ranker_spellings() {
        assert_eq!(SelectorKind::parse("Attribute"), Some(SelectorKind::Attribute));
        assert_eq!(SelectorKind::parse("attr"), Some(SelectorKind::Attribute));
        assert_eq!(SelectorKind::parse(" id "), Some(SelectorKind::Id));
        assert_eq!(SelectorKind::parse("class"), Some(SelectorKind::Structural));
        assert_eq!(SelectorKind::parse("xpath"), None);
    }
}
