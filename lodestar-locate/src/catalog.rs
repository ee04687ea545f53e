//! Named resolution strategies for the login surface.
//!
//! Each role carries a hand-ordered candidate list tuned against the pages
//! this tool drives. Lists are data, not logic: updating one after a page
//! redesign is an edit here, not a code change anywhere else.

use crate::candidate::{Candidate, CandidateList, SelectorKind};
use crate::dom::DocumentQuery;
use crate::resolver::{ResolutionFailure, Resolver};

/// Roles the login surface is expected to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiRole {
    LoginButton,
    EmailInput,
    PasswordInput,
    PasswordToggle,
    RememberMe,
    GoogleButton,
    GithubButton,
    ForgotPassword,
    SignupLink,
}

impl UiRole {
    pub const ALL: [UiRole; 9] = [
        UiRole::LoginButton,
        UiRole::EmailInput,
        UiRole::PasswordInput,
        UiRole::PasswordToggle,
        UiRole::RememberMe,
        UiRole::GoogleButton,
        UiRole::GithubButton,
        UiRole::ForgotPassword,
        UiRole::SignupLink,
    ];

    /// Human description used in logs and failure reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::LoginButton => "login button",
            Self::EmailInput => "email input",
            Self::PasswordInput => "password input",
            Self::PasswordToggle => "password visibility toggle",
            Self::RememberMe => "remember-me checkbox",
            Self::GoogleButton => "Google sign-in button",
            Self::GithubButton => "GitHub sign-in button",
            Self::ForgotPassword => "forgot-password link",
            Self::SignupLink => "signup link",
        }
    }

    /// Curated fallback list for this role. Order is the probe order.
    ///
    /// Selectors a page has moved away from stay listed ahead of their
    /// replacements until retired, so sessions against older deployments
    /// keep working. Input lists put semantic attributes ahead of id guesses.
    pub fn candidates(self) -> CandidateList {
        let entries: &[(&str, SelectorKind)] = match self {
            Self::LoginButton => &[
                (".login-btn", SelectorKind::Structural),
                (".btn-primary", SelectorKind::Structural),
                ("button[type=submit]", SelectorKind::Attribute),
                ("input[type=submit]", SelectorKind::Attribute),
                ("text=Sign In", SelectorKind::Text),
                ("form button", SelectorKind::Structural),
            ],
            Self::EmailInput => &[
                ("input[type=email]", SelectorKind::Attribute),
                ("input[name=email]", SelectorKind::Attribute),
                ("input[autocomplete=email]", SelectorKind::Attribute),
                ("input[placeholder*='email' i]", SelectorKind::Attribute),
                ("#email", SelectorKind::Id),
                (".form-group:first-of-type input", SelectorKind::Structural),
            ],
            Self::PasswordInput => &[
                ("input[type=password]", SelectorKind::Attribute),
                ("input[name=password]", SelectorKind::Attribute),
                ("input[autocomplete=current-password]", SelectorKind::Attribute),
                ("#password", SelectorKind::Id),
                (".password-wrapper input", SelectorKind::Structural),
            ],
            Self::PasswordToggle => &[
                ("#togglePassword", SelectorKind::Id),
                (".toggle-password", SelectorKind::Structural),
                (".password-wrapper button", SelectorKind::Structural),
            ],
            Self::RememberMe => &[
                ("input[type=checkbox]", SelectorKind::Attribute),
                ("#remember", SelectorKind::Id),
                (".checkbox-wrapper input", SelectorKind::Structural),
            ],
            Self::GoogleButton => &[
                (".google-btn", SelectorKind::Structural),
                ("button[aria-label*='google' i]", SelectorKind::Attribute),
                ("text=Google", SelectorKind::Text),
            ],
            Self::GithubButton => &[
                (".github-btn", SelectorKind::Structural),
                ("button[aria-label*='github' i]", SelectorKind::Attribute),
                ("text=GitHub", SelectorKind::Text),
            ],
            Self::ForgotPassword => &[
                (".forgot-password", SelectorKind::Structural),
                ("a[href*='forgot']", SelectorKind::Attribute),
                ("text=Forgot Password?", SelectorKind::Text),
            ],
            Self::SignupLink => &[
                (".signup-link a", SelectorKind::Structural),
                ("a[href*='signup']", SelectorKind::Attribute),
                ("text=Sign up", SelectorKind::Text),
            ],
        };

        CandidateList::new(
            entries
                .iter()
                .map(|(selector, kind)| Candidate::with_kind(*selector, *kind))
                .collect(),
        )
    }
}

/// Binds a resolver to a live document and exposes one accessor per role.
///
/// Accessors take no selector arguments: callers ask for the role and the
/// catalog supplies the current curated list. Nothing is cached, so each
/// call re-resolves against whatever the page looks like now.
pub struct Catalog<'a, D: DocumentQuery> {
    resolver: &'a Resolver,
    doc: &'a D,
}

impl<'a, D: DocumentQuery> Catalog<'a, D> {
    pub fn new(resolver: &'a Resolver, doc: &'a D) -> Self {
        Self { resolver, doc }
    }

    /// Resolve any role through its curated list.
    pub async fn resolve_role(&self, role: UiRole) -> Result<D::Element, ResolutionFailure> {
        self.resolver
            .resolve(self.doc, &role.candidates(), Some(role.description()))
            .await
    }

    pub async fn login_button(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::LoginButton).await
    }

    pub async fn email_input(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::EmailInput).await
    }

    pub async fn password_input(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::PasswordInput).await
    }

    pub async fn password_toggle(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::PasswordToggle).await
    }

    pub async fn remember_me(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::RememberMe).await
    }

    pub async fn google_button(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::GoogleButton).await
    }

    pub async fn github_button(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::GithubButton).await
    }

    pub async fn forgot_password(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::ForgotPassword).await
    }

    pub async fn signup_link(&self) -> Result<D::Element, ResolutionFailure> {
        self.resolve_role(UiRole::SignupLink).await
    }
}
