//! Credo Node - Messaging substrate for mesh components.
//!
//! A [`Node`] owns a non-blocking UDP endpoint and a commit log, and
//! drives a [`Component`] through a single-threaded poll loop: one
//! datagram per iteration, `apply_snapshot` before `on_message`, a brief
//! sleep between iterations. Transport failures are absorbed, never
//! surfaced to peers.

pub mod component;
pub mod ctx;
pub mod endpoint;
pub mod error;
pub mod node;

pub use component::Component;
pub use ctx::{NodeCtx, Transport};
pub use endpoint::{EndpointStats, UdpEndpoint};
pub use error::NetError;
pub use node::{Node, NodeOptions, ShutdownHandle};
