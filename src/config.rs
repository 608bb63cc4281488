use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "mapmarks.conf";

const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Tile providers the map layer knows how to construct.
pub const KNOWN_PROVIDERS: &[&str] = &["OpenStreetMap"];

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Side panel width when the location list is shown.
    pub panel_expanded_width: Option<f32>,
    /// Width of the collapsed strip that still holds the toggle.
    pub panel_collapsed_width: Option<f32>,
    /// Upper bound on a single Wikipedia query.
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// Registry override, same format as --locations.
    pub locations_file: Option<PathBuf>,
}

fn default_provider_name() -> String {
    "OpenStreetMap".to_string()
}

fn default_provider_url() -> String {
    OSM_TILE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: Some(1280),
            height: Some(720),
            panel_expanded_width: Some(200.0),
            panel_collapsed_width: Some(45.0),
            fetch_timeout_secs: Some(10),
            provider_name: default_provider_name(),
            provider_url: default_provider_url(),
            locations_file: None,
        }
    }
}

impl AppConfig {
    /// Load the config file, writing defaults on first run. A malformed
    /// file is logged and replaced by defaults in memory rather than
    /// aborting startup.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            log::warn!("no config directory available, using defaults");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed config {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                let cfg = Self::default();
                if let Err(e) = cfg.save() {
                    log::warn!("could not write default config: {:#}", e);
                }
                cfg
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path().context("no config directory available")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let raw = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(&path, raw).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.unwrap_or(10))
    }

    pub fn expanded_width(&self) -> f32 {
        self.panel_expanded_width.unwrap_or(200.0)
    }

    pub fn collapsed_width(&self) -> f32 {
        self.panel_collapsed_width.unwrap_or(45.0)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mapmarks").join(CONFIG_FILE_NAME))
}

/// Check a `{z}/{x}/{y}` tile URL template before handing it to the map
/// layer. Rejection is MapLoadFailure territory: the map stays off.
pub fn validate_tile_template(url: &str) -> anyhow::Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("tile URL template must start with http:// or https://, got {:?}", url);
    }
    for placeholder in ["{z}", "{x}", "{y}"] {
        if !url.contains(placeholder) {
            bail!("tile URL template {:?} is missing the {} placeholder", url, placeholder);
        }
    }
    Ok(())
}

pub fn validate_provider(name: &str) -> anyhow::Result<()> {
    if !KNOWN_PROVIDERS.contains(&name) {
        bail!("unknown tile provider {:?} (known: {})", name, KNOWN_PROVIDERS.join(", "));
    }
    Ok(())
}
