//! Reading captured management API documents from disk.

use anyhow::{Context, Result};
use brokerpulse::types::{
    nodes_from_value, ChannelSnapshot, ClusterSnapshot, ConnectionSnapshot, OverviewSnapshot,
    QueueSnapshot,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fs, path::Path, path::PathBuf};
use tracing::warn;

/// Paths of one capture: `/api/overview` is required, the listings are optional.
#[derive(Debug, Clone, Default)]
pub struct CaptureFiles {
    pub overview: PathBuf,
    pub nodes: Option<PathBuf>,
    pub connections: Option<PathBuf>,
    pub channels: Option<PathBuf>,
    pub queue: Option<PathBuf>,
}

pub struct Capture {
    pub cluster: ClusterSnapshot,
    pub queue: Option<QueueSnapshot>,
}

fn read_value(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = read_value(path)?;
    serde_json::from_value(value).with_context(|| format!("decoding {}", path.display()))
}

fn read_list<T: DeserializeOwned>(path: Option<&PathBuf>) -> Result<Vec<T>> {
    match path {
        Some(p) => read_doc(p),
        None => Ok(Vec::new()),
    }
}

pub fn load_capture(files: &CaptureFiles) -> Result<Capture> {
    let overview: OverviewSnapshot = read_doc(&files.overview)?;

    // A node listing that isn't an array is passed on as such; the estimator has a default for it.
    let nodes = match files.nodes.as_ref() {
        Some(p) => {
            let nodes = nodes_from_value(&read_value(p)?);
            if nodes.is_none() {
                warn!("{} is not a JSON array of nodes", p.display());
            }
            nodes
        }
        None => Some(Vec::new()),
    };
    let connections: Vec<ConnectionSnapshot> = read_list(files.connections.as_ref())?;
    let channels: Vec<ChannelSnapshot> = read_list(files.channels.as_ref())?;
    let queue = match files.queue.as_ref() {
        Some(p) => Some(read_doc::<QueueSnapshot>(p)?),
        None => None,
    };

    Ok(Capture {
        cluster: ClusterSnapshot {
            overview,
            nodes,
            connections,
            channels,
        },
        queue,
    })
}
