use std::path::PathBuf;

use clap::Args;
use credo_xfr::Xfr;

/// Arguments for the `xfr` command.
#[derive(Debug, Args)]
pub struct XfrArgs {
    /// Subsystem bus address to bind.
    #[arg(value_name = "SBA", default_value_t = 4005)]
    pub sba: u16,
}

pub fn execute(args: XfrArgs, config: Option<PathBuf>) -> anyhow::Result<()> {
    super::bootstrap::run(Xfr::new(args.sba), args.sba, config)
}
