use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use defs_core::{Function, FunctionData, Portal, PortalRegistry, Service, ServiceLifecycle, SimpleFunction};
use defs_schema::{FunctionSchema, IntegerSchema, Param, ServiceSchema, StringSchema};
use defs_schema::Schema;
use portal_http::{HttpPortal, HttpPortalConfig};
use portal_ws::{WsPortal, WsPortalConfig};
use runtime::{AppConfig, CliArgs};
use tokio_util::sync::CancellationToken;

/// defs demo server - schema-centric function dispatch over HTTP and WebSocket
#[derive(Parser)]
#[command(name = "defs-server")]
#[command(about = "defs demo server - schema-centric function dispatch over HTTP and WebSocket")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the HTTP portal (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("defs server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let ctx = CancellationToken::new();

    let http_config = HttpPortalConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        ..HttpPortalConfig::default()
    };
    let ws_config = WsPortalConfig {
        host: config.server.host.clone(),
        ..WsPortalConfig::default()
    };

    let http_portal = Arc::new(HttpPortal::new(http_config));
    let ws_portal = Arc::new(WsPortal::new(ws_config));

    let registry = PortalRegistry::new();
    registry.register_portal(http_portal.clone())?;
    registry.register_portal(ws_portal.clone())?;

    for function in example_functions() {
        http_portal.apply(ctx.clone(), function.clone()).await?;
        ws_portal.apply(ctx.clone(), function).await?;
    }
    for service in example_services() {
        http_portal.apply_service(ctx.clone(), service.clone()).await?;
        ws_portal.apply_service(ctx.clone(), service).await?;
    }

    http_portal.start(ctx.clone()).await?;
    ws_portal.start(ctx.clone()).await?;
    tracing::info!("http and ws portals are listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    ctx.cancel();
    registry.close_all().await?;
    Ok(())
}

/// Example functions exposed by the demo server: `greet` takes a `name` and
/// returns a greeting string.
fn example_functions() -> Vec<Arc<dyn Function>> {
    let greet_schema = FunctionSchema::new(
        vec![Param::required("name", Schema::String(StringSchema::new().min_length(1)))],
        vec![Param::required("greeting", Schema::String(StringSchema::new()))],
    )
    .expect("schema is internally consistent");

    let greet = SimpleFunction::new("greet", greet_schema, |_ctx, input| async move {
        let name = input.get("name").and_then(|v| v.as_str()).unwrap_or("world").to_string();
        let mut output = FunctionData::empty();
        output.set("greeting", serde_json::json!(format!("Hello, {name}!")));
        Ok(output)
    });

    vec![Arc::new(greet)]
}

/// Example service exposed by the demo server: `math` with `add` and
/// `multiply` methods over two integers.
fn example_services() -> Vec<Arc<dyn Service>> {
    vec![Arc::new(MathService::new())]
}

struct MathService {
    schema: ServiceSchema,
    lifecycle: ServiceLifecycle,
}

impl MathService {
    fn new() -> Self {
        let operand_schema = || Schema::Integer(IntegerSchema::new());
        let add_schema = FunctionSchema::new(
            vec![Param::required("a", operand_schema()), Param::required("b", operand_schema())],
            vec![Param::required("result", operand_schema())],
        )
        .expect("schema is internally consistent");
        let multiply_schema = add_schema.clone();

        let schema = ServiceSchema::new("math", vec![("add".into(), add_schema), ("multiply".into(), multiply_schema)])
            .expect("method names are unique");

        Self { schema, lifecycle: ServiceLifecycle::new() }
    }
}

impl Service for MathService {
    fn name(&self) -> &str {
        "math"
    }

    fn schema(&self) -> &ServiceSchema {
        &self.schema
    }

    fn get_method(&self, name: &str) -> Option<Arc<dyn Function>> {
        let schema = self.schema.method(name)?.clone();
        let handler: fn(i64, i64) -> i64 = match name {
            "add" => |a, b| a + b,
            "multiply" => |a, b| a * b,
            _ => return None,
        };

        Some(Arc::new(SimpleFunction::new(name, schema, move |_ctx, input| async move {
            let a = input.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
            let b = input.get("b").and_then(|v| v.as_i64()).unwrap_or(0);
            let mut output = FunctionData::empty();
            output.set("result", serde_json::json!(handler(a, b)));
            Ok(output)
        })))
    }

    fn status(&self) -> defs_core::ServiceState {
        self.lifecycle.state()
    }
}
