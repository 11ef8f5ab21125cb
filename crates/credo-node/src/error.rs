//! Substrate errors.
//!
//! Nothing here crosses a component boundary: the poll loop and the
//! capability surface collapse these into silent drops, keeping the
//! structured value available for logs and tests.

use std::io;

use credo_core::Sba;
use thiserror::Error;

/// Errors raised by the UDP substrate.
#[derive(Debug, Error)]
pub enum NetError {
    /// Socket could not be created, configured, or bound.
    #[error("bind failed on sba {sba}: {source}")]
    Bind {
        /// Requested service binding address.
        sba: Sba,
        /// Underlying socket error.
        source: io::Error,
    },

    /// The transport refused the datagram.
    #[error("send failed: {source}")]
    Send {
        /// Underlying socket error.
        source: io::Error,
    },

    /// The transport accepted fewer bytes than the frame holds.
    #[error("short write: {wrote} of {frame_len} bytes")]
    ShortWrite {
        /// Bytes the transport accepted.
        wrote: usize,
        /// Full frame length.
        frame_len: usize,
    },

    /// Reply requested before any inbound datagram arrived.
    #[error("no peer to reply to")]
    NoPeer,
}
