use std::path::PathBuf;
use std::sync::OnceLock;

use lodestar_common::observability::{init_logging, LogConfig, LogFormat};

static TRACING: OnceLock<PathBuf> = OnceLock::new();

/// Route test logs through the shared rolling-file setup.
/// `LODESTAR_LOG_FORMAT=json` switches the encoding.
pub fn init_test_tracing() {
    let _ = TRACING.get_or_init(|| {
        let json = std::env::var("LODESTAR_LOG_FORMAT")
            .is_ok_and(|raw| raw.trim().eq_ignore_ascii_case("json"));
        init_logging(LogConfig {
            app_name: "lodestar-tests",
            emit_stderr: true,
            format: if json { LogFormat::Json } else { LogFormat::Text },
            default_filter: "debug",
            ..LogConfig::default()
        })
        .unwrap_or_default()
    });
}
