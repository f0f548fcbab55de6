use std::fmt;

use clap::ValueEnum;

/// Crates whose events are shown below the `trace` level.
const LOG_TARGETS: &[&str] = &["graphql_microservice", "stitching_directives"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from the service
    Error,
    /// Warnings and errors from the service
    Warn,
    /// Info, warning and error messages from the service
    #[default]
    Info,
    /// Debug, info, warning and error messages from the service
    Debug,
    /// Trace, debug, info, warning and error messages from all dependencies
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(&self) -> String {
        match self {
            LogLevel::Off => "off".to_string(),
            LogLevel::Trace => "trace".to_string(),
            level => {
                let mut directives = LOG_TARGETS
                    .iter()
                    .map(|target| format!("{target}={level}"))
                    .collect::<Vec<_>>();

                directives.push("off".to_string());
                directives.join(",")
            }
        }
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters() {
        assert_eq!(LogLevel::Off.as_filter_str(), "off");
        assert_eq!(
            LogLevel::default().as_filter_str(),
            "graphql_microservice=info,stitching_directives=info,off"
        );
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
    }
}
