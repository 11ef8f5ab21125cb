use std::path::PathBuf;

use clap::Args;
use credo_bls::BeliefStore;

/// Arguments for the `bls` command.
#[derive(Debug, Args)]
pub struct BlsArgs {
    /// Subsystem bus address to bind.
    #[arg(value_name = "SBA", default_value_t = 4000)]
    pub sba: u16,
}

pub fn execute(args: BlsArgs, config: Option<PathBuf>) -> anyhow::Result<()> {
    super::bootstrap::run(BeliefStore::new(args.sba), args.sba, config)
}
