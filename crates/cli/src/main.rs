use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshdash_api::{prom, ClientConfig, HttpApi};
use meshdash_core::{LogLevel, MeshconfigDetail};
use meshdash_view::{LoadState, MeshConfigView, RouteParams};
use tracing::{error, info};

mod console;

use console::Console;

#[derive(Parser, Debug)]
#[command(name = "meshctl", version, about = "Inspect and edit mesh configs through the dashboard API")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Dashboard base URL
    #[arg(long = "base-url", global = true, env = "MESHDASH_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token for the dashboard API
    #[arg(long = "token", global = true, env = "MESHDASH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Prometheus base URL for `prom`
    #[arg(long = "prom-url", global = true, env = "MESHDASH_PROM_URL")]
    prom_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LevelArg { Error, Info }

impl From<LevelArg> for LogLevel {
    fn from(v: LevelArg) -> Self {
        match v {
            LevelArg::Error => LogLevel::Error,
            LevelArg::Info => LogLevel::Info,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a mesh config with its child endpoints and backend warnings
    Show { namespace: String, name: String },
    /// Print the pod/ingress/event listing endpoints of a mesh config
    Endpoints { namespace: String, name: String },
    /// Replace `spec` from a YAML or JSON file and save
    SetSpec {
        namespace: String,
        name: String,
        /// File holding the new spec (YAML or JSON)
        #[arg(long = "file")]
        file: PathBuf,
        /// Print the merged document summary without writing
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Set sidecar.logLevel and save
    SetLogLevel {
        namespace: String,
        name: String,
        #[arg(value_enum)]
        level: LevelArg,
    },
    /// Run a Prometheus instant query
    Prom { query: String },
}

fn init_tracing() {
    let env = std::env::var("MESHDASH_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("MESHDASH_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid MESHDASH_METRICS_ADDR; expected host:port");
        }
    }
}

fn client_config(cli: &Cli) -> ClientConfig {
    let mut cfg = ClientConfig::from_env();
    if let Some(url) = &cli.base_url { cfg.base_url = url.clone(); }
    if let Some(token) = &cli.token { cfg.token = Some(token.clone()); }
    if let Some(prom) = &cli.prom_url { cfg.prom_url = Some(prom.clone()); }
    cfg
}

/// Open the detail view for one mesh config and wait for the initial fetch.
async fn open_view(cfg: &ClientConfig, console: &Arc<Console>, namespace: &str, name: &str) -> Result<MeshConfigView> {
    let api = Arc::new(HttpApi::new(cfg.clone())?);
    let mut view = MeshConfigView::new(api, console.surfaces());
    view.activate(&RouteParams::for_resource(name, namespace));
    view.wait_loaded().await;
    if let LoadState::Failed(e) = view.load_state() {
        view.destroy();
        bail!("load {}/{}: {}", namespace, name, e);
    }
    Ok(view)
}

fn age(detail: &MeshconfigDetail) -> String {
    match detail.object_meta.creation_timestamp.as_ref() {
        Some(ts) => {
            let d = chrono::Utc::now().signed_duration_since(ts.0);
            if d.num_days() > 0 { format!("{}d", d.num_days()) }
            else if d.num_hours() > 0 { format!("{}h", d.num_hours()) }
            else { format!("{}m", d.num_minutes().max(0)) }
        }
        None => "-".into(),
    }
}

async fn save_and_report(view: &MeshConfigView, output: Output) -> Result<()> {
    let out = view.save().await?;
    match output {
        Output::Human => println!("saved {} ({})", out.url, out.summary),
        Output::Json => println!("{}", serde_json::to_string_pretty(&out.sent)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let cfg = client_config(&cli);
    let console = Arc::new(Console::default());

    let res = match &cli.command {
        Commands::Show { namespace, name } => {
            info!(ns = %namespace, name = %name, "show invoked");
            let mut view = open_view(&cfg, &console, namespace, name).await?;
            let detail = view.detail().ok_or_else(|| anyhow!("mesh config not loaded"))?;
            let eps = view.endpoints();
            match cli.output {
                Output::Human => {
                    println!("{} • {} • age {}", detail.namespace().unwrap_or("-"), detail.name(), age(&detail));
                    if let Some(level) = view.log_level() {
                        println!("sidecar log level: {}", level.label());
                    }
                    println!("pods:    {}", eps.pods);
                    println!("ingress: {}", eps.ingress);
                    println!("events:  {}", eps.events);
                    println!("{}", serde_yaml::to_string(&detail.spec)?);
                }
                Output::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "detail": detail, "endpoints": eps }))?
                ),
            }
            view.destroy();
            Ok(())
        }
        Commands::Endpoints { namespace, name } => {
            let eps = meshdash_core::ResourceEndpoint::new(meshdash_core::Resource::Meshconfig, true).children(name, namespace);
            match cli.output {
                Output::Human => {
                    println!("pods:    {}", eps.pods);
                    println!("ingress: {}", eps.ingress);
                    println!("events:  {}", eps.events);
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&eps)?),
            }
            Ok(())
        }
        Commands::SetSpec { namespace, name, file, dry_run } => {
            let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
            let spec: serde_json::Value = serde_yaml::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
            let mut view = open_view(&cfg, &console, namespace, name).await?;
            view.edit_spec(|buf| *buf = spec)?;
            let res = if *dry_run {
                let p = view.save_preview().await?;
                match cli.output {
                    Output::Human => println!("dry-run {} ({})", p.url, p.summary),
                    Output::Json => println!("{}", serde_json::to_string_pretty(&p.merged)?),
                }
                Ok(())
            } else {
                save_and_report(&view, cli.output).await
            };
            view.destroy();
            res
        }
        Commands::SetLogLevel { namespace, name, level } => {
            let mut view = open_view(&cfg, &console, namespace, name).await?;
            view.set_log_level((*level).into())?;
            let res = save_and_report(&view, cli.output).await;
            view.destroy();
            res
        }
        Commands::Prom { query } => {
            let endpoint = cfg.prom_url.as_deref().ok_or_else(|| anyhow!("no Prometheus URL (set --prom-url or MESHDASH_PROM_URL)"))?;
            let info = prom::query_metric(endpoint, query).await?;
            match cli.output {
                Output::Human => {
                    for s in &info.data.result {
                        let v = s.scalar().map(|v| v.to_string()).unwrap_or_else(|| "-".into());
                        let node = if s.metric.node_name.is_empty() { "-" } else { s.metric.node_name.as_str() };
                        println!("{} • {}", node, v);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&info)?),
            }
            Ok(())
        }
    };
    if let Err(e) = &res {
        error!(error = %e, alerts = console.alert_count(), "command failed");
    }
    res
}
