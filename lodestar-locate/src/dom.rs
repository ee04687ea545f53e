//! Adapter traits the resolver probes through, and the document digest fed
//! to the ranker.
//!
//! Selector strings are opaque at this boundary. Whatever dialect an adapter
//! speaks (`css=`, `xpath=`, `text=` prefixes or plain CSS) is parsed on the
//! adapter's side; the resolution core only hands strings across and observes
//! match or no-match.

use std::time::Duration;

use async_trait::async_trait;
use lodestar_common::Result;
use serde::{Deserialize, Serialize};

/// Query surface over a live document.
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    type Element: ElementHandle;

    /// All current matches, possibly empty.
    async fn query(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Number of current matches.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// First match, waiting up to `timeout` for one to appear.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Self::Element>;
}

/// Actions available on a resolved element.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    async fn click(&self) -> Result<()>;

    /// Clear the control, then type `text` into it.
    async fn fill(&self, text: &str) -> Result<()>;

    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn text(&self) -> Result<String>;

    async fn is_visible(&self) -> Result<bool>;

    async fn is_checked(&self) -> Result<bool>;

    async fn is_enabled(&self) -> Result<bool>;
}

/// Compact inventory of a document's interactive controls, grouped by form.
///
/// Adapters build this from the live page; the ranker renders it into the
/// prompt so selector proposals are grounded in what actually exists. Only
/// structure and identifying attributes are captured, never field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDigest {
    #[serde(default)]
    pub forms: Vec<FormDigest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDigest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub controls: Vec<ControlDigest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlDigest {
    pub tag: String,
    #[serde(default)]
    pub control_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl DocumentDigest {
    /// Hard cap on controls rendered into a prompt. Pathological pages stay
    /// within a predictable token footprint.
    pub const MAX_RENDERED_CONTROLS: usize = 40;

    pub fn is_empty(&self) -> bool {
        self.forms.iter().all(|f| f.controls.is_empty())
    }

    /// Render a bounded plain-text block for the ranking prompt, one control
    /// per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut emitted = 0usize;
        for (index, form) in self.forms.iter().enumerate() {
            let label = form.id.as_deref().unwrap_or("-");
            out.push_str(&format!("form[{index}] id={label}\n"));
            for control in &form.controls {
                if emitted >= Self::MAX_RENDERED_CONTROLS {
                    out.push_str("  ...\n");
                    return out;
                }
                out.push_str("  ");
                out.push_str(&control.render_line());
                out.push('\n');
                emitted += 1;
            }
        }
        out
    }
}

impl ControlDigest {
    fn render_line(&self) -> String {
        let mut parts = vec![self.tag.clone()];
        if let Some(t) = &self.control_type {
            parts.push(format!("type={t}"));
        }
        if let Some(id) = &self.id {
            parts.push(format!("id={id}"));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if !self.classes.is_empty() {
            parts.push(format!("class={}", self.classes.join(".")));
        }
        if let Some(placeholder) = &self.placeholder {
            parts.push(format!("placeholder={}", clip(placeholder)));
        }
        if let Some(text) = &self.text {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(format!("text={}", clip(text)));
            }
        }
        parts.join(" ")
    }
}

/// Trim free text to a prompt-friendly length, on a char boundary.
fn clip(s: &str) -> String {
    const MAX_CHARS: usize = 60;
    if s.chars().count() <= MAX_CHARS {
        s.to_string()
    } else {
        let cut: String = s.chars().take(MAX_CHARS).collect();
        format!("{cut}...")
    }
}
