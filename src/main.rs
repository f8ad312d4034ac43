//! Hostprint CLI
//!
//! Privacy-bounded host capability probing and report aggregation.

use clap::{Parser, Subcommand};
use hostprint::{
    config::{Config, EagerConfig},
    ledger::create_shared_ledger_with_persistence,
    report::SessionController,
    COLLECTION_DISCLOSURE, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[cfg(feature = "transport")]
use hostprint::{BlockingTransportClient, TransportConfig};

#[derive(Parser)]
#[command(name = "hostprint")]
#[command(author = "Hostprint")]
#[command(version = VERSION)]
#[command(about = "Privacy-bounded host capability probing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the eager probes and print a section summary
    Collect {
        /// Eager probes to run (env, display, storage, network, perms, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Print the full JSON snapshot instead of the summary table
        #[arg(long)]
        json: bool,
    },

    /// Run every probe and print the full report
    Full {
        /// Also write the report to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Run one on-demand probe and print its section
    Probe {
        /// Probe domain: graphics, media, authenticator, battery,
        /// sensors, canvas, transport, or composite
        domain: String,
    },

    /// Collect a full report and submit it to the remote collaborator
    Submit {
        /// Endpoint base URL (defaults to the configured endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Compare two stored reports by id
    Compare {
        a: String,
        b: String,

        /// Endpoint base URL (defaults to the configured endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Fetch a stored report by id
    Fetch {
        id: String,

        /// Endpoint base URL (defaults to the configured endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Write pre-redaction raw artifacts to a local file for inspection
    DebugExport {
        /// Output file (defaults to the data directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Repeat eager collection on an interval until interrupted
    Watch {
        /// Interval between collections, in seconds
        #[arg(long, default_value = "30")]
        interval: u64,
    },

    /// Show collection statistics
    Status,

    /// Display collection disclosure
    Privacy,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { sources, json } => cmd_collect(&sources, json),
        Commands::Full { output } => cmd_full(output),
        Commands::Probe { domain } => cmd_probe(&domain),
        Commands::Submit { endpoint } => cmd_submit(endpoint),
        Commands::Compare { a, b, endpoint } => cmd_compare(&a, &b, endpoint),
        Commands::Fetch { id, endpoint } => cmd_fetch(&id, endpoint),
        Commands::DebugExport { output } => cmd_debug_export(output),
        Commands::Watch { interval } => cmd_watch(interval),
        Commands::Status => cmd_status(),
        Commands::Privacy => cmd_privacy(),
        Commands::Config => cmd_config(),
    }
}

/// Current-thread runtime for driving async collection from the CLI.
fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create runtime")
}

fn load_config() -> Config {
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    config
}

fn controller_for(config: Config) -> SessionController {
    let ledger = create_shared_ledger_with_persistence(config.data_path.join("ledger.json"));
    SessionController::with_ledger(config, ledger)
}

fn save_ledger(controller: &SessionController) {
    if let Err(e) = controller.ledger().save() {
        eprintln!("Warning: Could not save collection ledger: {e}");
    }
}

fn cmd_collect(sources: &str, json: bool) {
    let mut config = load_config();
    config.eager = EagerConfig::from_csv(sources);
    if !config.eager.any_enabled() {
        eprintln!("Error: At least one eager probe must be enabled");
        std::process::exit(1);
    }

    let mut controller = controller_for(config);
    runtime().block_on(controller.collect_eager());
    let report = controller.assemble();

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("Hostprint v{VERSION}");
        println!("Session: {}", controller.session_id());
        println!();
        for (name, status) in report.section_status() {
            println!("  {name:<14} {status}");
        }
    }

    save_ledger(&controller);
}

fn cmd_full(output: Option<PathBuf>) {
    let config = load_config();
    let mut controller = controller_for(config);

    let rt = runtime();
    rt.block_on(async {
        controller.collect_eager().await;
        controller.collect_all_on_demand().await;
    });

    let report = controller.assemble();
    let text = match serde_json::to_string_pretty(&report) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error serializing report: {e}");
            std::process::exit(1);
        }
    };

    println!("{text}");

    if let Some(path) = output {
        match std::fs::write(&path, &text) {
            Ok(_) => eprintln!("Report written to {path:?}"),
            Err(e) => eprintln!("Error writing report: {e}"),
        }
    }

    save_ledger(&controller);
}

fn cmd_probe(domain: &str) {
    let config = load_config();
    let mut controller = controller_for(config);

    let known = runtime().block_on(controller.collect_domain(domain));
    if !known {
        eprintln!("Error: Unknown probe domain '{domain}'");
        eprintln!(
            "Known domains: graphics, media, authenticator, battery, sensors, canvas, transport, composite"
        );
        std::process::exit(1);
    }

    let report = controller.assemble();
    let snapshot = serde_json::to_value(&report).unwrap_or_default();
    match snapshot.get(domain) {
        Some(section) => println!(
            "{}",
            serde_json::to_string_pretty(section).unwrap_or_else(|_| "{}".to_string())
        ),
        None => eprintln!("Error: Section '{domain}' missing from snapshot"),
    }

    save_ledger(&controller);
}

#[cfg(feature = "transport")]
fn resolve_endpoint(config: &Config, endpoint: Option<String>) -> String {
    match endpoint.or_else(|| config.endpoint.clone()) {
        Some(endpoint) => endpoint,
        None => {
            eprintln!("Error: No endpoint configured.");
            eprintln!("Pass --endpoint or set \"endpoint\" in {:?}", Config::config_path());
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "transport")]
fn transport_client(config: &Config, endpoint: Option<String>) -> BlockingTransportClient {
    let base = resolve_endpoint(config, endpoint);
    match BlockingTransportClient::new(TransportConfig::new(base, config.transport_timeout)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error creating transport client: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "transport")]
fn cmd_submit(endpoint: Option<String>) {
    let config = load_config();
    let client = transport_client(&config, endpoint);

    let mut controller = controller_for(config);
    let rt = runtime();
    rt.block_on(async {
        controller.collect_eager().await;
        controller.collect_all_on_demand().await;
    });
    let report = controller.assemble();

    match client.submit(&report) {
        Ok(receipt) => {
            controller.ledger().record_submission();
            println!("Submitted: ok={}", receipt.ok);
            if let Some(id) = receipt.id {
                println!("  id:     {id}");
            }
            if let Some(digest) = receipt.digest {
                println!("  digest: {digest}");
            }
            if let Some(error) = receipt.error {
                println!("  error:  {error}");
            }
        }
        Err(e) => {
            eprintln!("Submission failed: {e}");
            std::process::exit(1);
        }
    }

    save_ledger(&controller);
}

#[cfg(not(feature = "transport"))]
fn cmd_submit(_endpoint: Option<String>) {
    eprintln!("Error: built without the transport feature");
    std::process::exit(1);
}

#[cfg(feature = "transport")]
fn cmd_compare(a: &str, b: &str, endpoint: Option<String>) {
    let config = load_config();
    let client = transport_client(&config, endpoint);

    match client.compare(a, b) {
        Ok(outcome) => {
            println!("Compared: ok={}", outcome.ok);
            if let Some(same) = outcome.same_digest {
                println!("  same digest: {same}");
            }
            if let Some(similarity) = outcome.similarity {
                println!("  similarity:  {similarity:.3}");
            }
            if let Some(diffs) = outcome.field_diffs {
                println!("  differing fields: {}", diffs.len());
                for diff in diffs {
                    println!("    {}: {} != {}", diff.path, diff.a, diff.b);
                }
            }
            if let Some(error) = outcome.error {
                println!("  error: {error}");
            }
        }
        Err(e) => {
            eprintln!("Comparison failed: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "transport"))]
fn cmd_compare(_a: &str, _b: &str, _endpoint: Option<String>) {
    eprintln!("Error: built without the transport feature");
    std::process::exit(1);
}

#[cfg(feature = "transport")]
fn cmd_fetch(id: &str, endpoint: Option<String>) {
    let config = load_config();
    let client = transport_client(&config, endpoint);

    match client.fetch(id) {
        Ok(report) => println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        ),
        Err(e) => {
            eprintln!("Fetch failed: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "transport"))]
fn cmd_fetch(_id: &str, _endpoint: Option<String>) {
    eprintln!("Error: built without the transport feature");
    std::process::exit(1);
}

fn cmd_debug_export(output: Option<PathBuf>) {
    let config = load_config();
    let path = output.unwrap_or_else(|| {
        config
            .data_path
            .join(format!(
                "debug_export_{}.json",
                chrono::Utc::now().format("%Y%m%d_%H%M%S")
            ))
    });

    let controller = controller_for(config);
    let export = controller.debug_export();

    match serde_json::to_string_pretty(&export) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                eprintln!("Error writing debug export: {e}");
                std::process::exit(1);
            }
            println!("Debug export written to {path:?}");
            println!("Contains PRE-REDACTION raw artifacts; for local inspection only.");
        }
        Err(e) => {
            eprintln!("Error serializing debug export: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_watch(interval: u64) {
    let config = load_config();
    let mut controller = controller_for(config);

    println!("Hostprint v{VERSION}");
    println!("Collecting every {interval}s. Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let rt = runtime();
    while running.load(Ordering::SeqCst) {
        rt.block_on(controller.collect_eager());
        let report = controller.assemble();

        let collected = report
            .section_status()
            .iter()
            .filter(|(_, status)| *status == "collected")
            .count();
        println!(
            "[{}] {} of {} sections collected",
            chrono::Utc::now().format("%H:%M:%S"),
            collected,
            report.section_status().len()
        );

        // Sleep in short slices so Ctrl+C stays responsive.
        let mut remaining = interval.max(1);
        while remaining > 0 && running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_secs(1));
            remaining -= 1;
        }
    }

    println!();
    save_ledger(&controller);
    println!("{}", controller.ledger().summary());
}

fn cmd_status() {
    let config = load_config();

    println!("Hostprint Status");
    println!("================");
    println!();
    println!("Configuration:");
    println!("  Probe deadline: {}ms", config.probe_deadline.as_millis());
    println!("  Gather cap: {}ms", config.gather_cap.as_millis());
    println!(
        "  Endpoint: {}",
        config.endpoint.as_deref().unwrap_or("(not configured)")
    );
    println!();

    let ledger_path = config.data_path.join("ledger.json");
    if ledger_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&ledger_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                for key in [
                    "probes_run",
                    "probes_collected",
                    "probes_unsupported",
                    "probes_failed",
                    "redactions",
                    "reports_assembled",
                    "submissions",
                ] {
                    if let Some(value) = stats.get(key) {
                        println!("  {}: {value}", key.replace('_', " "));
                    }
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_privacy() {
    println!("{COLLECTION_DISCLOSURE}");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
