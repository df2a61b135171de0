//! Logging initialization for cosigner binaries.
use std::env;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "COSIGNER_SVC_LABEL";

/// Set to `1` to include source file names in log lines.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Set to `1` to include line numbers in log lines.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the process in logs.
    whoami: String,

    /// Whether to log source file names.
    with_file: bool,

    /// Whether to log line numbers.
    with_line_number: bool,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set and source locations taken
    /// from the environment.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            with_file: env_flag(LOG_FILE_ENVVAR),
            with_line_number: env_flag(LOG_LINE_NUM_ENVVAR),
        }
    }

    /// Creates a new instance with the whoami string derived from `base`.
    pub fn with_base_name(base: &str) -> Self {
        Self::new(get_whoami_string(base))
    }

    /// The whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(cosigner)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init(config: LoggerConfig) {
    let filt = EnvFilter::from_default_env();

    let stderr_sub = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(
            tracing_subscriber::fmt::format()
                .compact()
                .with_file(config.with_file)
                .with_line_number(config.with_line_number),
        )
        .with_filter(filt);

    tracing_subscriber::registry().with(stderr_sub).init();

    info!(whoami = %config.whoami, "logging started");
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}
