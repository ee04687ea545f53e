//! Resilient element resolution for live, mutable documents.
//!
//! Pages drift: classes get renamed, forms are restructured, ids disappear.
//! This crate locates elements through ordered fallback instead of single
//! selectors. A [`Resolver`] walks a [`CandidateList`] front to back under a
//! time budget and returns the first match; candidate lists come from a
//! curated [`catalog`], deterministic keyword [`rules`], or an LLM-backed
//! [`RankedSource`] that degrades to the rules when anything goes wrong.
//!
//! The document itself sits behind the [`DocumentQuery`] trait, so the core
//! never touches a browser directly.
//!
//! ```rust
//! use lodestar_locate::rules;
//!
//! let list = rules::candidates_for("email input");
//! assert_eq!(list.iter().next().unwrap().selector, "input[type=email]");
//! assert!(rules::candidates_for("the weather in Lisbon").is_empty());
//! ```

pub mod candidate;
pub mod catalog;
pub mod dom;
pub mod fallback;
pub mod ranker;
pub mod resolver;
pub mod rules;

pub use candidate::{Candidate, CandidateList, SelectorKind};
pub use catalog::{Catalog, UiRole};
pub use dom::{ControlDigest, DocumentDigest, DocumentQuery, ElementHandle, FormDigest};
pub use fallback::{generic_candidates, resolve_or_fallback, semantic_fallback};
pub use ranker::{CandidateSource, RankedSource, RuleSource};
pub use resolver::{ResolutionFailure, Resolver, ResolverSettings};
