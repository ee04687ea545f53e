//! Live end-to-end checks against a running WebDriver service.
//!
//! Ignored by default. Start a chromedriver (or set
//! `LODESTAR_WEBDRIVER_URL` to another endpoint) and run:
//!
//! ```text
//! cargo test -p lodestar-webdriver -- --ignored
//! ```

mod common;

use std::time::Duration;

use common::init_test_tracing;
use lodestar_locate::{
    resolve_or_fallback, CandidateList, Catalog, DocumentQuery, ElementHandle, Resolver,
    ResolverSettings,
};
use lodestar_webdriver::WebSession;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sign In</title></head>
<body>
<form id="loginForm">
  <div class="form-group">
    <label for="email">Email</label>
    <input type="email" id="email" name="email" placeholder="Enter your email">
  </div>
  <div class="form-group password-wrapper">
    <label for="password">Password</label>
    <input type="password" id="password" name="password" placeholder="Enter your password">
    <button type="button" id="togglePassword" class="toggle-password">Show</button>
  </div>
  <label class="checkbox-wrapper"><input type="checkbox" id="remember" name="remember"> Remember me</label>
  <button type="submit" class="btn-primary">Sign In</button>
</form>
<p class="signup-link">No account yet? <a href="/signup">Sign up</a></p>
</body>
</html>"#;

fn webdriver_url() -> String {
    std::env::var("LODESTAR_WEBDRIVER_URL")
        .unwrap_or_else(|_| "http://localhost:9515".to_string())
}

fn data_url(html: &str) -> String {
    let encoded = html
        .replace('\n', "")
        .replace('"', "%22")
        .replace(' ', "%20");
    format!("data:text/html,{encoded}")
}

#[tokio::test]
#[ignore]
async fn resolves_and_drives_a_login_page() -> anyhow::Result<()> {
    init_test_tracing();
    let session = WebSession::connect(&webdriver_url(), true).await?;
    let page = session.open(&data_url(LOGIN_PAGE)).await?;

    let digest = page.digest().await?;
    assert!(!digest.is_empty());
    let rendered = digest.render();
    assert!(rendered.contains("id=email"), "digest missing email control:\n{rendered}");

    // The text= dialect goes through the XPath strategy.
    assert!(page.count("text=Sign In").await? >= 1);

    let resolver = Resolver::default();
    let catalog = Catalog::new(&resolver, &page);

    let email = catalog.email_input().await?;
    assert_eq!(email.attribute("id").await?.as_deref(), Some("email"));
    email.fill("user@example.com").await?;

    let password = catalog.password_input().await?;
    password.fill("hunter2").await?;

    catalog.password_toggle().await?.click().await?;

    let remember = catalog.remember_me().await?;
    assert!(!remember.is_checked().await?);
    remember.click().await?;
    assert!(remember.is_checked().await?);

    let login = catalog.login_button().await?;
    assert!(login.is_enabled().await?);
    login.click().await?;

    session.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn generic_fallback_recovers_an_unstyled_button() -> anyhow::Result<()> {
    init_test_tracing();
    let session = WebSession::connect(&webdriver_url(), true).await?;
    let page = session
        .open(&data_url("<html><body><button>Go</button></body></html>"))
        .await?;

    // Small budget keeps the miss phase short before the fallback kicks in.
    let resolver = Resolver::new(ResolverSettings {
        budget: Duration::from_secs(2),
        per_candidate_cap: Duration::from_millis(500),
    });
    let candidates = CandidateList::from_selectors([".does-not-exist"]);

    let element = resolve_or_fallback(&resolver, &page, &candidates, Some("go button")).await?;
    assert_eq!(element.text().await?, "Go");

    session.close().await?;
    Ok(())
}
