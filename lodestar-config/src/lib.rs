//! Typed configuration for the Lodestar workspace.
//!
//! A `lodestar.yaml` file carries three sections: `resolver` (probe timing),
//! `ranker` (optional LLM backend for candidate ranking) and `webdriver`
//! (session endpoint). `LODESTAR_`-prefixed environment variables override
//! file values, and `${VAR}` placeholders anywhere in the merged tree are
//! interpolated before the typed structs are produced.
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use lodestar_common::RankerConfig;
use serde::Deserialize;
use serde_json::Value;

const ENV_EXPANSION_PASSES: usize = 8;

/// Top-level configuration for a Lodestar deployment.
#[derive(Debug, Deserialize)]
pub struct LodestarConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub resolver: ResolverSection,
    /// Absent section means ranking is unavailable and the rule-based
    /// candidate source is used exclusively.
    #[serde(default)]
    pub ranker: Option<RankerConfig>,
    #[serde(default)]
    pub webdriver: WebDriverSection,
}

/// Probe timing knobs for the resolution engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSection {
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,
    #[serde(default = "default_per_candidate_cap_ms")]
    pub per_candidate_cap_ms: u64,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            budget_ms: default_budget_ms(),
            per_candidate_cap_ms: default_per_candidate_cap_ms(),
        }
    }
}

impl ResolverSection {
    /// Total wall-clock budget for one resolution call.
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    /// Ceiling on the per-candidate probe window.
    pub fn per_candidate_cap(&self) -> Duration {
        Duration::from_millis(self.per_candidate_cap_ms)
    }
}

/// WebDriver session endpoint and browser mode.
#[derive(Debug, Clone, Deserialize)]
pub struct WebDriverSection {
    #[serde(default = "default_webdriver_url")]
    pub url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for WebDriverSection {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

fn default_budget_ms() -> u64 {
    10_000
}
fn default_per_candidate_cap_ms() -> u64 {
    2_000
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}

/// Walk the merged tree and interpolate `${VAR}` in every string leaf.
fn expand_placeholders(node: &mut Value) {
    match node {
        Value::String(text) => expand_string(text),
        Value::Array(items) => {
            for item in items {
                expand_placeholders(item);
            }
        }
        Value::Object(fields) => {
            for field in fields.values_mut() {
                expand_placeholders(field);
            }
        }
        _ => {}
    }
}

/// Interpolate one string, re-running until it settles so values that expand
/// to further `${VAR}` references also resolve. The pass cap bounds cycles;
/// a lookup failure leaves the string untouched.
fn expand_string(text: &mut String) {
    if !text.contains('$') {
        return;
    }
    for _ in 0..ENV_EXPANSION_PASSES {
        let next = match shellexpand::env(text.as_str()) {
            Ok(expanded) if expanded.as_ref() != text.as_str() => expanded.into_owned(),
            _ => return,
        };
        *text = next;
    }
}

/// Layered loader: files and inline snippets first, `LODESTAR_` environment
/// variables last.
pub struct LodestarConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for LodestarConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LodestarConfigLoader {
    /// Empty loader; every section falls back to its defaults until a source
    /// is attached.
    ///
    /// ```
    /// let config = lodestar_config::LodestarConfigLoader::new()
    ///     .with_yaml_str("version: '2'")
    ///     .load()
    ///     .expect("defaults apply");
    ///
    /// assert_eq!(config.version.as_deref(), Some("2"));
    /// assert_eq!(config.webdriver.url, "http://localhost:9515");
    /// assert!(config.ranker.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Merge a configuration file. The `config` crate infers the format from
    /// the extension; a missing file surfaces as a load error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet, mostly for tests and examples.
    ///
    /// ```
    /// use lodestar_common::RankerConfig;
    /// use lodestar_config::LodestarConfigLoader;
    ///
    /// let config = LodestarConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// resolver:
    ///   per_candidate_cap_ms: 1500
    /// ranker:
    ///   provider: "ollama"
    ///   model: "llama3.2:3b"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.resolver.per_candidate_cap_ms, 1500);
    /// assert_eq!(config.resolver.budget_ms, 10_000);
    /// assert_eq!(config.ranker.as_ref().map(RankerConfig::model), Some("llama3.2:3b"));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all attached sources, overlay `LODESTAR_` environment variables,
    /// interpolate placeholders and produce the typed configuration.
    ///
    /// ```
    /// use lodestar_common::RankerConfig;
    /// use lodestar_config::LodestarConfigLoader;
    ///
    /// unsafe { std::env::set_var("RANKER_TOKEN", "injected-from-env"); }
    ///
    /// let config = LodestarConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// version: "1"
    /// ranker:
    ///   provider: "openai"
    ///   model: "gpt-4o-mini"
    ///   auth_token: "${RANKER_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// let RankerConfig::Openai { model, auth_token, endpoint, .. } =
    ///     config.ranker.expect("ranker section")
    /// else {
    ///     panic!("expected the OpenAI provider");
    /// };
    /// assert_eq!(model, "gpt-4o-mini");
    /// assert_eq!(auth_token, "injected-from-env");
    /// assert_eq!(endpoint, "https://api.openai.com/v1");
    ///
    /// unsafe { std::env::remove_var("RANKER_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<LodestarConfig, ConfigError> {
        // The environment source is attached last so `LODESTAR_` variables win
        // over anything the files set.
        let merged = self
            .builder
            .add_source(
                Environment::with_prefix("LODESTAR")
                    .separator("__")
                    // Numeric knobs like budget_ms must survive the env round trip.
                    .try_parsing(true),
            )
            .build()?;

        // Round-trip through serde_json::Value so placeholder expansion sees
        // the fully merged tree, then materialise the typed structs.
        let mut tree: Value = merged.try_deserialize()?;
        expand_placeholders(&mut tree);
        serde_json::from_value(tree).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_in_plain_string_resolves() {
        temp_env::with_var("DRIVER_HOST", Some("chromedriver.local"), || {
            let mut node = json!("http://${DRIVER_HOST}:9515");
            expand_placeholders(&mut node);
            assert_eq!(node, json!("http://chromedriver.local:9515"));
        });
    }

    #[test]
    fn walker_reaches_arrays_and_maps() {
        temp_env::with_vars([("MODEL", Some("gpt-4o")), ("TIER", Some("mini"))], || {
            let mut node = json!({
                "models": ["base-$MODEL", { "name": "${MODEL}-${TIER}" }],
                "budget_ms": 9000,
                "headless": true,
                "ranker": null
            });
            expand_placeholders(&mut node);
            assert_eq!(
                node,
                json!({
                    "models": ["base-gpt-4o", { "name": "gpt-4o-mini" }],
                    "budget_ms": 9000,
                    "headless": true,
                    "ranker": null
                })
            );
        });
    }

    #[test]
    fn nested_references_resolve_over_passes() {
        temp_env::with_vars(
            [
                // HOST references PORT and DRIVER_URL references HOST, so
                // full interpolation needs more than one pass.
                ("PORT", Some("9515")),
                ("HOST", Some("localhost:${PORT}")),
                ("DRIVER_URL", Some("http://${HOST}/")),
            ],
            || {
                let mut node = json!({ "url": "${DRIVER_URL}" });
                expand_placeholders(&mut node);
                assert_eq!(node, json!({ "url": "http://localhost:9515/" }));
            },
        );
    }

    #[test]
    fn cyclic_references_terminate() {
        temp_env::with_vars([("PING", Some("${PONG}")), ("PONG", Some("${PING}"))], || {
            let mut node = json!("probe: ${PING}");
            expand_placeholders(&mut node);
            // The pass cap leaves the cycle unresolved instead of spinning.
            let text = node.as_str().unwrap();
            assert!(text.starts_with("probe: "));
            assert!(text.contains("${"));
        });
    }

    #[test]
    fn undefined_placeholder_is_preserved() {
        let mut node = json!("token-${NOT_SET_ANYWHERE}");
        expand_placeholders(&mut node);
        assert_eq!(node, json!("token-${NOT_SET_ANYWHERE}"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = LodestarConfigLoader::new()
            .with_yaml_str("version: '1'")
            .load()
            .unwrap();

        assert_eq!(cfg.resolver.budget(), Duration::from_secs(10));
        assert_eq!(cfg.resolver.per_candidate_cap(), Duration::from_secs(2));
        assert_eq!(cfg.webdriver.url, "http://localhost:9515");
        assert!(cfg.webdriver.headless);
        assert!(cfg.ranker.is_none());
    }
}
