use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// Default viewport center (Brooklyn) and zoom used when the app starts.
pub const MAP_CENTER: (f64, f64) = (40.6572759, -73.9510873);
pub const MAP_ZOOM: f64 = 14.0;

/// One named point of interest. Loaded once at startup, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationEntry {
    fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self { name: name.to_string(), lat, lon }
    }

    pub fn coords_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Built-in registry used when no --locations file is given.
pub fn default_locations() -> Vec<LocationEntry> {
    vec![
        LocationEntry::new("Brooklyn Bridge", 40.7061, -73.9969),
        LocationEntry::new("Prospect Park", 40.6602, -73.9690),
        LocationEntry::new("Brooklyn Museum", 40.6712, -73.9636),
        LocationEntry::new("Brooklyn Botanic Garden", 40.6676, -73.9632),
        LocationEntry::new("Barclays Center", 40.6826, -73.9754),
        LocationEntry::new("Grand Army Plaza", 40.6743, -73.9702),
        LocationEntry::new("Coney Island", 40.5755, -73.9707),
        LocationEntry::new("Green-Wood Cemetery", 40.6580, -73.9904),
    ]
}

#[derive(Deserialize)]
struct LocationsFile {
    #[serde(default)]
    location: Vec<LocationEntry>,
}

/// Load a registry from a TOML file with repeated [[location]] tables.
pub fn load_locations(path: &Path) -> anyhow::Result<Vec<LocationEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading locations file {:?}", path))?;
    let parsed: LocationsFile = toml::from_str(&raw)
        .with_context(|| format!("parsing locations file {:?}", path))?;

    if parsed.location.is_empty() {
        bail!("locations file {:?} contains no [[location]] entries", path);
    }
    for entry in &parsed.location {
        if entry.name.trim().is_empty() {
            bail!("locations file {:?}: entry with empty name", path);
        }
        if !entry.coords_valid() {
            bail!(
                "locations file {:?}: {:?} has out-of-range coordinates ({}, {})",
                path, entry.name, entry.lat, entry.lon
            );
        }
    }
    Ok(parsed.location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_registry_sane() {
        let locs = default_locations();
        assert!(!locs.is_empty());
        assert!(locs.iter().all(|l| l.coords_valid()));
        // Registry order is meaningful; the bridge comes first.
        assert_eq!(locs[0].name, "Brooklyn Bridge");
    }

    #[test]
    fn test_load_locations_toml() {
        let mut f = tempfile_path("locs_ok.toml");
        writeln!(
            f.1,
            "[[location]]\nname = \"Brooklyn Bridge\"\nlat = 40.7061\nlon = -73.9969\n\n\
             [[location]]\nname = \"Prospect Park\"\nlat = 40.6602\nlon = -73.9690\n"
        )
        .unwrap();
        let locs = load_locations(&f.0).unwrap();
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[1].name, "Prospect Park");
        std::fs::remove_file(&f.0).ok();
    }

    #[test]
    fn test_load_locations_rejects_bad_coords() {
        let mut f = tempfile_path("locs_bad.toml");
        writeln!(f.1, "[[location]]\nname = \"Nowhere\"\nlat = 95.0\nlon = 0.0\n").unwrap();
        assert!(load_locations(&f.0).is_err());
        std::fs::remove_file(&f.0).ok();
    }

    #[test]
    fn test_load_locations_rejects_empty() {
        let mut f = tempfile_path("locs_empty.toml");
        writeln!(f.1, "# nothing here").unwrap();
        assert!(load_locations(&f.0).is_err());
        std::fs::remove_file(&f.0).ok();
    }

    fn tempfile_path(name: &str) -> (std::path::PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!("mapmarks_test_{}_{}", std::process::id(), name));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
