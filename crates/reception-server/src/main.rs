//! Reception operations executable
//!
//! Bootstraps the workflow store and offers the operational commands the
//! plant runs day to day: registering procurement orders, listing workflows
//! by status and checking store health.

use anyhow::Context;
use clap::{Arg, Command};

use reception_core::workflow::IdentityDirectory;
use reception_core::{paths, ReceptionConfig, StaticDirectory, WorkflowStatus, WorkflowStore};
use reception_types::StockReceptionOrder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("reception-server")
        .version("1.0.0")
        .about("Raw-material reception workflow operations")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/app/config/reception.json"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory for workflow files (overrides config)"),
        )
        .arg(
            Arg::new("register-order")
                .long("register-order")
                .value_name("FILE")
                .help("Register a procurement order JSON as a new workflow"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .value_name("STATUS")
                .help("List workflows in the given status (directory name)"),
        )
        .arg(
            Arg::new("health-check")
                .long("health-check")
                .help("Print store health and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").unwrap();
    let config = ReceptionConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    log::info!(
        "Loaded configuration for plant '{}' ({})",
        config.plant.name,
        config.plant.site_code
    );

    // Initialize data directory
    let data_dir = matches
        .get_one::<String>("data-dir")
        .cloned()
        .unwrap_or_else(|| config.storage.data_dir.clone());
    if let Err(e) = paths::init_data_root(data_dir.clone()) {
        log::warn!("Data root initialization warning: {}", e);
    }
    log::info!("Using data directory: {}", data_dir);

    let store = WorkflowStore::open_at_data_root()?;

    let directory = StaticDirectory::from_config(&config.directory)?;
    let actor = directory.current_actor().await?;
    log::info!("Session actor: {} ({:?})", actor.name, actor.role);

    if matches.get_flag("health-check") {
        let health = store.health_check()?;
        println!(
            "Store health: {:?} ({} workflows under {})",
            health.status,
            health.total_workflows,
            health.root_path.display()
        );
        for status in WorkflowStatus::ALL {
            let count = health.counts.get(status);
            if count > 0 {
                println!("  {:<28} {}", status.directory_name(), count);
            }
        }
        return Ok(());
    }

    if let Some(status_name) = matches.get_one::<String>("list") {
        let status = WorkflowStatus::from_directory_name(status_name)
            .with_context(|| format!("Unknown workflow status '{}'", status_name))?;

        let workflows = store.list_by_status(status)?;
        println!(
            "{} workflow(s) in {}",
            workflows.len(),
            status.directory_name()
        );
        for state in workflows {
            println!(
                "  {}  order {}  {} {} from {}  (updated {})",
                state.workflow_id,
                state.order.id,
                state.order.quantity,
                state.order.unit,
                state.order.supplier,
                state.updated_at
            );
        }
        return Ok(());
    }

    if let Some(order_file) = matches.get_one::<String>("register-order") {
        let json = std::fs::read_to_string(order_file)
            .with_context(|| format!("Failed to read order file {}", order_file))?;
        let order: StockReceptionOrder =
            serde_json::from_str(&json).context("Failed to parse procurement order")?;

        let workflow_id = store.create(order)?;
        println!("Registered workflow {}", workflow_id);
        return Ok(());
    }

    // Default: print a counts summary
    let counts = store.counts()?;
    println!("{} reception workflow(s) on file", counts.total());
    for status in WorkflowStatus::ALL {
        println!("  {:<28} {}", status.directory_name(), counts.get(status));
    }

    Ok(())
}
