use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lambda_local_proxy::config::load_config;
use lambda_local_proxy::gateway::GatewayKind;
use lambda_local_proxy::lifecycle::{signals, Shutdown};
use lambda_local_proxy::observability::{logging, metrics};
use lambda_local_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "lambda-local-proxy")]
#[command(about = "Serve an AWS Lambda function over plain HTTP", long_about = None)]
struct Cli {
    /// Lambda function name
    #[arg(short = 'f', long = "function")]
    function: Option<String>,

    /// Address to bind
    #[arg(short = 'l', long = "bind")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Lambda Invoke API endpoint
    #[arg(short = 'e', long)]
    endpoint: Option<String>,

    /// HTTP gateway event format
    #[arg(short = 't', long = "gateway-type", value_enum)]
    gateway_type: Option<GatewayKind>,

    /// Use multi-value headers and query parameters
    #[arg(short = 'm', long = "multi-value")]
    multi_value: bool,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), |config| {
        if let Some(function) = cli.function {
            config.lambda.function_name = function;
        }
        if let Some(bind) = cli.bind {
            config.listener.bind_address = bind;
        }
        if let Some(port) = cli.port {
            config.listener.port = port;
        }
        if let Some(endpoint) = cli.endpoint {
            config.lambda.endpoint = Some(endpoint);
        }
        if let Some(kind) = cli.gateway_type {
            config.gateway.kind = kind;
        }
        if cli.multi_value {
            config.gateway.multi_value_headers = true;
        }
        if let Some(region) = cli.region {
            config.lambda.region = Some(region);
        }
    })?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        function = %config.lambda.function_name,
        gateway = %config.gateway.kind,
        multi_value = config.gateway.multi_value_headers,
        "lambda-local-proxy starting"
    );

    if config.observability.metrics_enabled {
        // Address already checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listener.listen_address()).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
