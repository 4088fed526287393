use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use ups_client::config::loader;
use ups_client::config::settings::{AppConfig, Environment, LogFormat};
use ups_client::observability::metrics::get_metrics;
use ups_client::utils::logging::{self, LogLevel};
use ups_client::{RequestOptions, TrackingOptions, UpsClient};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; `${VAR:default}` placeholders are expanded
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long, env = "UPS_ENVIRONMENT", value_enum)]
    environment: Option<Environment>,
    #[arg(long, env = "UPS_ENVIRONMENT_URL")]
    environment_url: Option<String>,
    #[arg(long, env = "UPS_CLIENT_ID")]
    client_id: Option<String>,
    #[arg(long, env = "UPS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print Prometheus metrics to stderr before exiting
    #[arg(long)]
    dump_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch (or reuse) an OAuth access token and print it as JSON
    Token,
    /// Look up shipment tracking details
    Track {
        inquiry_number: String,
        /// Extra query parameter, `key=value`; repeatable
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        #[arg(long)]
        locale: Option<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid KEY=value: no '=' found in '{}'", s))?;
    Ok((key.to_owned(), value.to_owned()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config + logging
    // -------------------------------

    let args = Args::parse();
    let mut app_config = match &args.config {
        Some(path) => loader::file_to_config(path).with_context(|| format!("failed to load config '{}'", path))?,
        None => AppConfig::default(),
    };
    logging::init_logging(&logging::resolve(
        app_config.logging.as_ref(),
        args.log_level,
        args.log_format,
    ));

    // -------------------------------
    // 2. Apply CLI / env overrides
    // -------------------------------

    let client_config = &mut app_config.client;
    if let Some(environment) = args.environment {
        client_config.environment_url = environment.url().to_owned();
    }
    if let Some(url) = args.environment_url {
        client_config.environment_url = url;
    }
    if let Some(client_id) = args.client_id {
        client_config.client_id = client_id;
    }
    if let Some(client_secret) = args.client_secret {
        client_config.client_secret = client_secret;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        client_config.timeout_ms = timeout_ms;
    }

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let ups = UpsClient::new(app_config.client.clone())?;
    info!("using UPS environment {}", ups.config().environment_url);

    let timeout = ups.config().default_timeout();
    let output = match args.command {
        Command::Token => {
            let token = ups.get_access_token(&RequestOptions::with_timeout(timeout)).await?;
            serde_json::to_string_pretty(&token.raw)?
        }
        Command::Track { inquiry_number, params, locale } => {
            let mut options = TrackingOptions::new().timeout(timeout);
            if let Some(locale) = locale {
                options = options.locale(locale);
            }
            for (key, value) in params {
                options = options.param(key, value);
            }
            let tracking = ups.get_tracking(&inquiry_number, &options).await?;
            serde_json::to_string_pretty(&tracking)?
        }
    };
    println!("{}", output);

    if args.dump_metrics {
        eprintln!("{}", get_metrics().await.encode_text());
    }
    Ok(())
}
