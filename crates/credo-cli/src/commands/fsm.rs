use std::path::PathBuf;

use clap::Args;
use credo_fsm::Fsm;

/// Arguments for the `fsm` command.
#[derive(Debug, Args)]
pub struct FsmArgs {
    /// Subsystem bus address to bind.
    #[arg(value_name = "SBA", default_value_t = 4001)]
    pub sba: u16,
}

pub fn execute(args: FsmArgs, config: Option<PathBuf>) -> anyhow::Result<()> {
    super::bootstrap::run(Fsm::new(args.sba), args.sba, config)
}
