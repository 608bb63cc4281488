use std::path::PathBuf;

use clap::Parser;

mod config;
mod filter;
mod gui;
mod locations;
mod marker;
mod panel;
mod state;
mod wiki;

use config::AppConfig;
use locations::LocationEntry;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("APP_GIT_HASH"), ")");

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Browse neighborhood locations on a map with Wikipedia summaries.", long_about = None)]
struct Cli {
    /// TOML file with [[location]] entries replacing the built-in registry
    #[arg(long, value_name = "FILE")]
    locations: Option<PathBuf>,

    /// Tile provider name
    #[arg(long)]
    provider: Option<String>,

    /// Wikipedia fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the location registry and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn validate(&self) -> Result<(), String> {
        if self.timeout == Some(0) {
            return Err("Timeout must be positive".to_string());
        }
        if let Some(ref path) = self.locations
            && !path.exists()
        {
            return Err(format!("Locations file does not exist: {:?}", path));
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Cli::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut config = AppConfig::load();
    if let Some(secs) = args.timeout {
        config.fetch_timeout_secs = Some(secs);
    }
    if let Some(ref provider) = args.provider {
        config.provider_name = provider.clone();
    }

    let registry_file = args.locations.clone().or_else(|| config.locations_file.clone());
    let entries: Vec<LocationEntry> = match registry_file {
        Some(path) => locations::load_locations(&path)?,
        None => locations::default_locations(),
    };

    if args.list {
        for entry in &entries {
            println!("{}  ({:.4}, {:.4})", entry.name, entry.lat, entry.lon);
        }
        return Ok(());
    }

    let mut state = state::AppState::new(&entries);
    if let Err(e) = gui::map_view::validate_tile_config(&config) {
        state.set_map_error(format!("{:#}", e));
    }

    println!("Launching map...");
    let app = gui::GuiApp::new(state, config);
    if let Err(e) = app.run() {
        eprintln!("GUI Error: {}", e);
    }
    Ok(())
}
