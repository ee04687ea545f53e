//! Last-ditch generic selectors for when curated candidates exhaust.

use tracing::warn;

use crate::candidate::{Candidate, CandidateList, SelectorKind};
use crate::dom::DocumentQuery;
use crate::resolver::{ResolutionFailure, Resolver};

/// The fixed generic sequence, in decreasing specificity. The description
/// being resolved does not influence it.
pub fn generic_candidates() -> CandidateList {
    CandidateList::new(vec![
        Candidate::with_kind("button[type=submit]", SelectorKind::Attribute),
        Candidate::with_kind("input[type=submit]", SelectorKind::Attribute),
        Candidate::with_kind("[role=button]", SelectorKind::Attribute),
        Candidate::with_kind("form button", SelectorKind::Structural),
        Candidate::with_kind("button", SelectorKind::Structural),
    ])
}

/// Probe the generic sequence after a curated list came up empty.
///
/// A match here is logged loudly: it means the primary candidates have gone
/// stale and precision has degraded to a guess, which is worth an operator's
/// attention even though the caller gets a usable element.
pub async fn semantic_fallback<D: DocumentQuery>(
    resolver: &Resolver,
    doc: &D,
    description: Option<&str>,
) -> Result<D::Element, ResolutionFailure> {
    warn!(
        target: "locate.fallback",
        description = description.unwrap_or("element"),
        "primary candidates exhausted; probing generic semantic fallback"
    );
    resolver.resolve(doc, &generic_candidates(), description).await
}

/// Resolve `candidates`, then degrade to the generic sequence on failure.
///
/// A terminal failure reports the full probe order across both phases.
pub async fn resolve_or_fallback<D: DocumentQuery>(
    resolver: &Resolver,
    doc: &D,
    candidates: &CandidateList,
    description: Option<&str>,
) -> Result<D::Element, ResolutionFailure> {
    match resolver.resolve(doc, candidates, description).await {
        Ok(element) => Ok(element),
        Err(primary) => match semantic_fallback(resolver, doc, description).await {
            Ok(element) => Ok(element),
            Err(generic) => {
                let mut attempted = primary.attempted;
                attempted.extend(generic.attempted);
                Err(ResolutionFailure {
                    description: primary.description,
                    attempted,
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_sequence_is_fixed_and_ordered() {
        let first = generic_candidates();
        let second = generic_candidates();
        assert_eq!(first, second);
        assert_eq!(first.selectors()[0], "button[type=submit]");
        assert_eq!(first.selectors().last().map(String::as_str), Some("button"));
    }
}
