//! # QRPC CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Positional path segments
//! qrpc call --address calc/add/2/3
//!
//! # Request parameters
//! qrpc call --address calc/divide -p a=10 -p b=4
//!
//! # Dispatch by method name with a JSON body
//! qrpc call --name add --body '[2, 3]'
//!
//! # Deferred responses from a callback
//! qrpc call --address calc/countdown/3
//!
//! # List every route under a root address
//! qrpc routes --root api
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`); responses go to
//! stdout as one JSON document.

use anyhow::Result;
use argh::FromArgs;
use qrpc_server::{QueueConfig, ServiceConfig};
use std::time::Duration;

#[derive(FromArgs)]
/// QRPC - method dispatch over service addresses
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Call(CallArgs),
    Routes(RoutesArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// dispatch one call and print its responses
struct CallArgs {
    /// service address to call, e.g. calc/add/2/3
    #[argh(option, short = 'a')]
    address: Option<String>,

    /// method name to call, bypassing address resolution
    #[argh(option, short = 'n')]
    name: Option<String>,

    /// call body as JSON
    #[argh(option, short = 'b')]
    body: Option<String>,

    /// call parameter as key=value (repeatable)
    #[argh(option, short = 'p', long = "param")]
    params: Vec<String>,

    /// root address the service is mounted under
    #[argh(option)]
    root: Option<String>,

    /// explicit service address (default: calc)
    #[argh(option, long = "service-address")]
    service_address: Option<String>,

    /// return address echoed in the responses
    #[argh(option, long = "return-address", default = "\"cli\".into()")]
    return_address: String,

    /// idle timeout of the service queue in milliseconds
    #[argh(option, long = "idle-timeout-ms", default = "30000")]
    idle_timeout_ms: u64,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "routes")]
/// list the addresses of the demo service
struct RoutesArgs {
    /// root address the service is mounted under
    #[argh(option)]
    root: Option<String>,

    /// explicit service address (default: calc)
    #[argh(option, long = "service-address")]
    service_address: Option<String>,
}

fn service_config(root: Option<String>, service_address: Option<String>) -> ServiceConfig {
    ServiceConfig {
        root_address: root,
        service_address,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Set default log level to INFO, but allow RUST_LOG env var to override
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Call(args) => run_call(args).await,
        Commands::Routes(args) => {
            let config = service_config(args.root, args.service_address);
            for line in qrpc_cli::routes(&config)? {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// Executes the `call` subcommand.
///
/// # Errors
///
/// Returns an error if:
/// - The call arguments are malformed (body JSON, `key=value` params)
/// - The service configuration is invalid
/// - The call hit a fatal configuration fault (the responses are still printed)
async fn run_call(args: CallArgs) -> Result<()> {
    let call = qrpc_cli::build_call(
        args.address.as_deref(),
        args.name.as_deref(),
        args.body.as_deref(),
        &args.params,
        &args.return_address,
    )?;

    let config = service_config(args.root, args.service_address);
    let queue_config = QueueConfig::new().with_idle_timeout(Duration::from_millis(args.idle_timeout_ms));

    let output = qrpc_cli::run_call(&config, queue_config, call).await?;
    println!("{}", output.encoded);

    if output.fatal {
        anyhow::bail!("service binding configuration fault");
    }
    Ok(())
}
