use std::{fs, net::SocketAddr, path::PathBuf};

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use graphql_microservice::ServiceConfig;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

mod log;

pub(crate) use self::log::{LogLevel, LogStyle};

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "graphql-microservice", version)]
#[command(arg_required_else_help = true)]
/// Serves federation subgraphs as schema stitching services
pub(crate) struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Set the logging level
    #[arg(long = "log", env = "MICROSERVICE_LOG", global = true)]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "MICROSERVICE_LOG_STYLE", default_value_t = LogStyle::Text, global = true)]
    pub log_style: LogStyle,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Prints the stitching SDL of a federation schema
    Stitch(SchemaArgs),
    /// Serves a federation schema over HTTP and WebSocket
    Serve(ServeArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SchemaArgs {
    /// Path to the federation SDL of the service
    #[arg(long, short, env = "MICROSERVICE_SCHEMA_PATH")]
    pub schema: PathBuf,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "MICROSERVICE_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Path to a JSON object whose properties are the values of the `Query` fields
    #[arg(long, env = "MICROSERVICE_ROOT_VALUE_PATH")]
    pub root_value: Option<PathBuf>,
    /// IP address on which the server will listen for incoming connections. Defaults to
    /// `listen_address` of the configuration, then to 127.0.0.1:4000.
    #[arg(short, long, env = "MICROSERVICE_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
}

impl SchemaArgs {
    pub fn type_defs(&self) -> anyhow::Result<String> {
        fs::read_to_string(&self.schema).map_err(|e| anyhow!("error loading schema {}:\n{e}", self.schema.display()))
    }

    pub fn config(&self) -> anyhow::Result<ServiceConfig> {
        let Some(path) = &self.config else {
            return Ok(ServiceConfig::default());
        };

        let config = fs::read_to_string(path).map_err(|e| anyhow!("error loading config {}:\n{e}", path.display()))?;

        toml::from_str(&config).map_err(|e| anyhow!("error parsing config {}:\n{e}", path.display()))
    }
}

impl ServeArgs {
    pub fn root_value(&self) -> anyhow::Result<Option<String>> {
        self.root_value
            .as_ref()
            .map(|path| fs::read_to_string(path).map_err(|e| anyhow!("error loading root value {}:\n{e}", path.display())))
            .transpose()
    }
}

impl Args {
    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer();

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stdout) => layer.with_ansi(true).boxed(),
            // for server logs, colors are off
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}
