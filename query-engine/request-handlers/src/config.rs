use serde::Deserialize;
use user_facing_errors::ErrorFormat;

/// Client options that shape how requests are validated and logged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub error_format: ErrorFormat,
    pub log_queries: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            error_format: ErrorFormat::Colorless,
            log_queries: false,
        }
    }
}

impl ClientConfig {
    /// Resolves the error format from the process environment.
    pub fn from_env() -> Self {
        let node_env = std::env::var("NODE_ENV").ok();

        Self {
            error_format: error_format_for(node_env.as_deref()),
            ..Default::default()
        }
    }

    /// Parses a JSON options object. A missing `errorFormat` falls back to the environment.
    pub fn from_json(options: serde_json::Value) -> Result<Self, serde_json::Error> {
        let explicit_format = options.get("errorFormat").is_some();
        let mut config: Self = serde_json::from_value(options)?;

        if !explicit_format {
            config.error_format = Self::from_env().error_format;
        }

        Ok(config)
    }

    pub fn error_format(mut self, error_format: ErrorFormat) -> Self {
        self.error_format = error_format;
        self
    }

    pub fn log_queries(mut self, log_queries: bool) -> Self {
        self.log_queries = log_queries;
        self
    }
}

/// Colors are never on unless asked for, so `NO_COLOR` needs no handling of its own.
fn error_format_for(node_env: Option<&str>) -> ErrorFormat {
    match node_env {
        Some("production") => ErrorFormat::Minimal,
        _ => ErrorFormat::Colorless,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn production_is_minimal() {
        assert_eq!(error_format_for(Some("production")), ErrorFormat::Minimal);
        assert_eq!(error_format_for(Some("development")), ErrorFormat::Colorless);
        assert_eq!(error_format_for(None), ErrorFormat::Colorless);
    }

    #[test]
    fn explicit_options_win() {
        let config = ClientConfig::from_json(json!({ "errorFormat": "pretty", "logQueries": true })).unwrap();

        assert_eq!(config, ClientConfig::default().error_format(ErrorFormat::Pretty).log_queries(true));
    }

    #[test]
    fn unknown_formats_are_rejected() {
        assert!(ClientConfig::from_json(json!({ "errorFormat": "loud" })).is_err());
    }
}
