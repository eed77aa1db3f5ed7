use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use hibp_range_client::config::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, ENDPOINT_ENV, MAX_RETRIES_ENV,
};
use hibp_range_client::{BreachLookup, Hash, LookupConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hibp-range")]
#[command(about = "Check a password against Have I Been Pwned without revealing its hash")]
struct Args {
    /// SHA-1 digest to check (40 hex characters, any case)
    #[arg(required_unless_present = "password", conflicts_with = "password")]
    hash: Option<String>,

    /// Read a single password from stdin and hash it locally instead
    #[arg(long)]
    password: bool,

    /// Range API endpoint; the 5-character prefix is appended to it
    #[arg(long, env = ENDPOINT_ENV, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Maximum retries when rate limited with a Retry-After hint
    #[arg(long, env = MAX_RETRIES_ENV, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Ask the service to pad responses with decoy records
    #[arg(long)]
    padding: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Lookup(#[from] hibp_range_client::Error),

    #[error("failed to read password from stdin: {0}")]
    Stdin(#[from] io::Error),

    #[error("no password on stdin")]
    EmptyPassword,
}

fn read_password() -> Result<String, CliError> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::EmptyPassword);
    }
    Ok(password.to_string())
}

fn run(args: Args) -> Result<Hash, CliError> {
    let config = LookupConfig {
        endpoint: args.endpoint,
        max_retries: args.max_retries,
        timeout: Duration::from_secs(args.timeout_secs),
        add_padding: args.padding,
        ..LookupConfig::default()
    };
    let lookup = BreachLookup::new(config)?;

    let hash = match args.hash {
        Some(digest) => lookup.check(&digest)?,
        None => lookup.check_password(&read_password()?)?,
    };
    Ok(hash)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // 0: not found, 1: pwned, 2: lookup failed
    match run(args) {
        Ok(hash) if hash.is_pwned() => {
            println!("pwned ({} occurrences)", hash.count());
            ExitCode::from(1)
        }
        Ok(_) => {
            println!("not found");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
