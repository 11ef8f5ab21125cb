//! Node construction shared by every component command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use credo_config::{CredoConfig, NodeConfig};
use credo_core::Sba;
use credo_node::{Component, Node, NodeOptions};
use tracing::info;

fn load_config(path: Option<PathBuf>) -> anyhow::Result<CredoConfig> {
    match path {
        Some(path) => CredoConfig::from_file(&path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(CredoConfig::load_scoped().unwrap_or_default()),
    }
}

fn node_options(node: &NodeConfig) -> NodeOptions {
    NodeOptions {
        bls_sba: node.bls_sba,
        poll_interval: Duration::from_micros(node.poll_interval_us),
        recv_buffer_bytes: node.recv_buffer_bytes,
    }
}

/// Bind the component and poll until the process is terminated.
pub fn run<C: Component>(
    component: C,
    sba: Sba,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    info!(
        sba,
        bls_sba = config.node.bls_sba,
        poll_interval_us = config.node.poll_interval_us,
        "bootstrapping node"
    );

    let mut node = Node::with_options(component, sba, node_options(&config.node));
    if !node.is_running() {
        bail!("could not bind sba {sba}");
    }
    node.run();
    Ok(())
}
