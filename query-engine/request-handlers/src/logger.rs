use serde::Deserialize;
use tracing::{dispatcher::SetGlobalDefaultError, subscriber};
use tracing_subscriber::{EnvFilter, Layer, filter::Directive, layer::SubscriberExt};

type LoggerResult<T> = Result<T, SetGlobalDefaultError>;

/// Target of the events carrying generated requests.
pub(crate) const QUERY_TARGET: &str = "request_handlers::query";

const CRATES: [&str; 4] = ["request_handlers", "query_core", "dmmf", "user_facing_errors"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// An installer for a global logger.
#[derive(Debug, Clone)]
pub struct Logger<'a> {
    service_name: &'static str,
    log_format: LogFormat,
    log_queries: bool,
    log_level: Option<&'a str>,
}

impl<'a> Logger<'a> {
    /// Initialize a new global logger installer.
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            log_format: LogFormat::Json,
            log_queries: false,
            log_level: None,
        }
    }

    /// Sets the STDOUT log output format. Default: Json.
    pub fn log_format(&mut self, log_format: LogFormat) -> &mut Self {
        self.log_format = log_format;
        self
    }

    /// Enable query logging. Default: false.
    pub fn log_queries(&mut self, log_queries: bool) -> &mut Self {
        self.log_queries = log_queries;
        self
    }

    /// Level for the client crates, e.g. `debug`. Falls back to `PRISMA_CLIENT_LOG_LEVEL`.
    pub fn log_level(&mut self, log_level: &'a str) -> &mut Self {
        self.log_level = (!log_level.is_empty()).then_some(log_level);
        self
    }

    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    /// Install logger as a global. Can be called only once per application instance.
    pub fn install(&self) -> LoggerResult<()> {
        let filter = self.env_filter();

        let fmt_layer = match self.log_format {
            LogFormat::Text => tracing_subscriber::fmt::layer().with_filter(filter).boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(filter).boxed(),
        };

        let subscriber = tracing_subscriber::registry().with(fmt_layer);
        subscriber::set_global_default(subscriber)?;

        tracing::debug!(service = self.service_name, "logger installed");

        Ok(())
    }

    fn env_filter(&self) -> EnvFilter {
        let level = self
            .log_level
            .map(ToOwned::to_owned)
            .or_else(|| std::env::var("PRISMA_CLIENT_LOG_LEVEL").ok());

        create_env_filter(EnvFilter::from_default_env(), self.log_queries, level.as_deref())
    }
}

fn create_env_filter(mut filter: EnvFilter, log_queries: bool, level: Option<&str>) -> EnvFilter {
    let mut directives: Vec<String> = Vec::new();

    if let Some(level) = level {
        directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    }

    if log_queries {
        // Queries are logged at debug level even when the crate level is higher.
        directives.push(format!("{QUERY_TARGET}=debug"));
    }

    for directive in directives {
        match directive.parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(err) => eprintln!("Ignoring invalid log directive `{directive}`: {err}"),
        }
    }

    filter
}
