//! Tracing macros for the credo mesh.
//!
//! Targets are scoped per plane so operators can filter substrate noise
//! from engine decisions (`RUST_LOG=credo::net=warn,credo::engine=debug`).
//!
//! The macros expand through this crate's `tracing` re-export, so
//! callers do not need their own `tracing` dependency.
//!
//! When the `no-trace` feature is enabled, all macros compile to nothing
//! for zero overhead in production builds.

// ---- With tracing enabled (default) ----

/// Trace substrate-level events (sockets, frames, commits).
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! credo_net {
    ($level:ident, $($arg:tt)*) => {
        $crate::tracing::$level!(target: "credo::net", $($arg)*)
    }
}

/// Trace engine-level events (ticks, transitions, control verbs).
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! credo_engine {
    ($level:ident, $($arg:tt)*) => {
        $crate::tracing::$level!(target: "credo::engine", $($arg)*)
    }
}

/// Trace belief-store events (absorbed commits, served snapshots).
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! credo_store {
    ($level:ident, $($arg:tt)*) => {
        $crate::tracing::$level!(target: "credo::store", $($arg)*)
    }
}

// ---- With tracing disabled (no-trace feature) ----

/// Trace substrate-level events - compiles to nothing when no-trace is enabled
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! credo_net {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace engine-level events - compiles to nothing when no-trace is enabled
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! credo_engine {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace belief-store events - compiles to nothing when no-trace is enabled
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! credo_store {
    ($level:ident, $($arg:tt)*) => {};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_credo_net() {
        credo_net!(debug, frame_len = 12, "frame queued");
    }

    #[test]
    fn test_credo_engine() {
        credo_engine!(info, from = "Idle", to = "Armed", "transition fired");
    }

    #[test]
    fn test_credo_store() {
        credo_store!(trace, subjects = 3usize, "snapshot served");
    }
}
