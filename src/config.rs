use clap::Parser;

/// Fallback connection string for local development databases only;
/// anything real comes in through DATABASE_URL.
pub const DEFAULT_DATABASE_URL: &str =
    "user=postgres password=postgres dbname=postgres sslmode=disable";

pub const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Parser)]
#[command(version, about = "Read-only HTTP API over the tables of a PostgreSQL database")]
pub struct Args {
    /// PostgreSQL connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        hide_env_values = true
    )]
    pub database_url: String,
}
