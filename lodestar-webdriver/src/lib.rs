//! WebDriver adapter for the resolution core.
//!
//! Implements [`lodestar_locate::DocumentQuery`] and
//! [`lodestar_locate::ElementHandle`] over a `fantoccini` client, so the
//! resolver can probe a real browser the same way it probes a test double.
//!
//! - [`WebSession`]: connect to a WebDriver service and open pages
//! - [`WebPage`]: document queries, navigation, digest collection
//! - [`WebElement`]: click, fill and inspect resolved elements
//!
//! Selector strings may carry a `css=`, `xpath=` or `text=` prefix to pick
//! the location strategy; unprefixed strings are treated as CSS. That
//! dialect is private to this crate, the resolution core never interprets
//! selector contents.

mod digest;
mod element;
mod page;
mod selector;
mod session;

pub use element::WebElement;
pub use page::WebPage;
pub use session::WebSession;
