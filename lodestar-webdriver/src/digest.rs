//! Document digest collection via injected JavaScript.
//!
//! One round trip gathers every interactive control, grouped by owning form,
//! with controls outside any form collected into a trailing group. Only
//! structure and identifying attributes cross the wire; field values never
//! leave the page.

use anyhow::{anyhow, Result};
use fantoccini::Client;
use lodestar_locate::DocumentDigest;
use tracing::debug;

/// Per-group ceiling. Pathological pages with thousands of controls produce
/// a bounded payload instead of a multi-megabyte one.
const DIGEST_SCRIPT: &str = r#"
const MAX_PER_GROUP = 60;
const controlTags = new Set(['input', 'button', 'select', 'textarea', 'a']);
const describe = (el) => ({
    tag: el.tagName.toLowerCase(),
    control_type: el.getAttribute('type'),
    id: el.id || null,
    name: el.getAttribute('name'),
    classes: Array.from(el.classList),
    placeholder: el.getAttribute('placeholder'),
    text: (el.innerText || '').trim().slice(0, 80) || null,
});

const forms = Array.from(document.forms).map((form) => ({
    id: form.id || null,
    controls: Array.from(form.elements)
        .filter((el) => controlTags.has(el.tagName.toLowerCase()))
        .slice(0, MAX_PER_GROUP)
        .map(describe),
}));

const owned = new Set();
for (const form of document.forms) {
    for (const el of form.elements) owned.add(el);
}
const orphans = Array.from(document.querySelectorAll('input, button, select, textarea, a'))
    .filter((el) => !owned.has(el))
    .slice(0, MAX_PER_GROUP)
    .map(describe);
if (orphans.length > 0) {
    forms.push({ id: null, controls: orphans });
}

return { forms };
"#;

pub(crate) async fn collect(client: &Client) -> Result<DocumentDigest> {
    let value = client.execute(DIGEST_SCRIPT, vec![]).await?;
    let digest: DocumentDigest = serde_json::from_value(value)
        .map_err(|e| anyhow!("digest script returned an unexpected shape: {e}"))?;
    debug!(
        target: "webdriver.digest",
        forms = digest.forms.len(),
        "collected document digest"
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use lodestar_locate::DocumentDigest;
    use serde_json::json;

    #[test]
    fn script_output_shape_decodes() {
        // Mirrors what the injected script produces for a login form plus
        // an out-of-form signup link.
        let value = json!({
            "forms": [
                {
                    "id": "loginForm",
                    "controls": [
                        {
                            "tag": "input",
                            "control_type": "email",
                            "id": "email",
                            "name": "email",
                            "classes": [],
                            "placeholder": "Enter your email",
                            "text": null
                        },
                        {
                            "tag": "button",
                            "control_type": "submit",
                            "id": null,
                            "name": null,
                            "classes": ["btn-primary"],
                            "placeholder": null,
                            "text": "Sign In"
                        }
                    ]
                },
                {
                    "id": null,
                    "controls": [
                        {
                            "tag": "a",
                            "control_type": null,
                            "id": null,
                            "name": null,
                            "classes": [],
                            "placeholder": null,
                            "text": "Sign up"
                        }
                    ]
                }
            ]
        });

        let digest: DocumentDigest = serde_json::from_value(value).unwrap();
        assert_eq!(digest.forms.len(), 2);
        assert_eq!(digest.forms[0].id.as_deref(), Some("loginForm"));
        assert_eq!(digest.forms[0].controls[0].control_type.as_deref(), Some("email"));
        assert_eq!(digest.forms[1].controls[0].text.as_deref(), Some("Sign up"));

        let rendered = digest.render();
        assert!(rendered.contains("form[0] id=loginForm"));
        assert!(rendered.contains("text=Sign In"));
    }

    #[test]
    fn sparse_output_fills_defaults() {
        let value = json!({
            "forms": [{ "controls": [{ "tag": "input" }] }]
        });
        let digest: DocumentDigest = serde_json::from_value(value).unwrap();
        assert_eq!(digest.forms[0].id, None);
        assert!(digest.forms[0].controls[0].classes.is_empty());
    }
}
