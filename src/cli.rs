//! Command Line Interface (CLI) arguments.

use clap::builder::TypedValueParser;
use clap::Parser;

/// Climate API command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "CLIMATE_API_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "CLIMATE_API_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "CLIMATE_API_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/climate-api/certs/cert.pem",
        env = "CLIMATE_API_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/climate-api/certs/key.pem",
        env = "CLIMATE_API_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "CLIMATE_API_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "CLIMATE_API_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Path to the SQLite climate dataset
    #[arg(
        long,
        default_value = "Resources/hawaii.sqlite",
        env = "CLIMATE_API_DATABASE"
    )]
    pub database: String,
    /// Maximum number of climate store connections open at once. Defaults to the number of CPUs.
    #[arg(
        long,
        env = "CLIMATE_API_CONNECTION_LIMIT",
        value_parser = clap::value_parser!(u64).range(1..).map(|limit| limit as usize)
    )]
    pub connection_limit: Option<usize>,
    /// Time in milliseconds a store connection waits on a locked database before failing
    #[arg(long, default_value_t = 5000, env = "CLIMATE_API_BUSY_TIMEOUT_MS")]
    pub busy_timeout_ms: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
