#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the `tracing` event macros when the `tracing` feature is
//! enabled. Without the feature the same names expand to nothing, so call
//! sites write `crate::warn!(...)` unconditionally.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, trace, warn};

// When tracing is not enabled, provide no-op macros
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

// Note: Macros are exported at crate root via #[macro_export],
// so we don't need to re-export noop_macros::* here.

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_structured_fields() {
        let index = 3usize;
        crate::debug!(index, "moved");
        crate::trace!(target: "reel", index = index, "traced");
        crate::warn!(pattern = "|3", "invalid pattern");
        crate::info!("plain message");
    }
}
