//! CLI commands.
//!
//! Each component kind is launched from its own module; the node
//! construction they share lives in `bootstrap`.

mod bootstrap;

pub mod bls;
pub mod fsm;
pub mod xfr;

pub use bls::BlsArgs;
pub use fsm::FsmArgs;
pub use xfr::XfrArgs;
