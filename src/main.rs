use std::path::PathBuf;
use std::sync::mpsc;

use clap::Parser;
use tracing::{error, info};

use toy_router::{Router, RouterConfig};

#[derive(Parser)]
#[command(name = "toy-router", about = "Static IPv4 forwarder over raw packet sockets")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/toy-router/routes.toml")]
    config: PathBuf,

    /// Only listen on these interfaces (overrides `router.interfaces`)
    #[arg(short, long = "interface")]
    interfaces: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match RouterConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config from {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };
    if !cli.interfaces.is_empty() {
        config.router.interfaces = cli.interfaces;
    }

    toy_router::logging::init(&config.logging);

    let router = match Router::start(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("failed to start router: {e}");
            std::process::exit(1);
        }
    };
    let names: Vec<&str> = router.interfaces().map(|i| i.name.as_str()).collect();
    info!("forwarding on {}", names.join(", "));

    // Block until Ctrl+C
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        error!("failed to set Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    stop_rx.recv().ok();

    info!("received interrupt, shutting down");
    router.log_stats();
}
