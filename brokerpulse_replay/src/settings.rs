//! Heuristic overrides: optional JSON file merged over the built-in constants.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/brokerpulse/heuristics.json (fallback ~/.config/brokerpulse/heuristics.json)

use brokerpulse::Heuristics;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("brokerpulse")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brokerpulse")
    }
}

pub fn heuristics_path() -> PathBuf {
    config_dir().join("heuristics.json")
}

/// Load overrides from `explicit` or the default location. Fields the file omits keep their
/// defaults; an unreadable or invalid file is reported and ignored.
pub fn load_heuristics(explicit: Option<&Path>) -> Heuristics {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(heuristics_path);
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!("ignoring invalid heuristics file {}: {e}", path.display());
            Heuristics::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => Heuristics::default(),
        Err(e) => {
            warn!("cannot read heuristics file {}: {e}", path.display());
            Heuristics::default()
        }
    }
}
