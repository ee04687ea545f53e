//! Deterministic keyword rules mapping element descriptions to selectors.
//!
//! This is the floor the ranking layer degrades to: no document inspection,
//! no randomness, the same description always yields the same list. Lists
//! order semantic attribute selectors ahead of id guesses, with text and
//! structural catch-alls last.

use crate::candidate::{Candidate, CandidateList, SelectorKind};

/// Map a free-form description to a curated selector list.
///
/// Matching is case-insensitive and keyword based. Descriptions that fit no
/// known bucket yield an empty list, which the resolver reports as an
/// immediate failure rather than guessing.
pub fn candidates_for(description: &str) -> CandidateList {
    let needle = description.to_lowercase();

    if needle.contains("email") {
        email_input()
    } else if needle.contains("password") {
        password_input()
    } else if needle.contains("login")
        || needle.contains("log in")
        || needle.contains("sign in")
        || needle.contains("submit")
    {
        login_button()
    } else {
        CandidateList::default()
    }
}

fn login_button() -> CandidateList {
    CandidateList::new(vec![
        Candidate::with_kind("button[type=submit]", SelectorKind::Attribute),
        Candidate::with_kind("input[type=submit]", SelectorKind::Attribute),
        Candidate::with_kind("#login-button", SelectorKind::Id),
        Candidate::with_kind("text=Sign In", SelectorKind::Text),
        Candidate::with_kind("text=Log In", SelectorKind::Text),
        Candidate::with_kind("form button", SelectorKind::Structural),
    ])
}

fn email_input() -> CandidateList {
    CandidateList::new(vec![
        Candidate::with_kind("input[type=email]", SelectorKind::Attribute),
        Candidate::with_kind("input[name=email]", SelectorKind::Attribute),
        Candidate::with_kind("input[autocomplete=email]", SelectorKind::Attribute),
        Candidate::with_kind("input[placeholder*='email' i]", SelectorKind::Attribute),
        Candidate::with_kind("#email", SelectorKind::Id),
        Candidate::with_kind("form input[type=text]:first-of-type", SelectorKind::Structural),
    ])
}

fn password_input() -> CandidateList {
    CandidateList::new(vec![
        Candidate::with_kind("input[type=password]", SelectorKind::Attribute),
        Candidate::with_kind("input[name=password]", SelectorKind::Attribute),
        Candidate::with_kind("input[autocomplete=current-password]", SelectorKind::Attribute),
        Candidate::with_kind("#password", SelectorKind::Id),
    ])
}
