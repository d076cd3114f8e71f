//! Tracing subscriber setup for the CLI.
//!
//! Logs go to stderr so stdout carries nothing but generated manifests.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`text` or `json`).
pub const LOG_FORMAT_ENV: &str = "SECRET_INJECT_LOG_FORMAT";

pub fn init() {
    let filter = EnvFilter::from_default_env().add_directive(default_directive());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_directive() -> tracing_subscriber::filter::Directive {
    "secret_inject=info"
        .parse()
        .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into())
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("json"))
}
