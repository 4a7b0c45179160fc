// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Error taxonomy. Every variant is terminal for the current run: a
// retried send/recv would corrupt the timing, so nothing is retried
// and nothing is swallowed.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Creation/open/bind/attach of a named OS resource failed.
    #[error("resource error in {op}: {source}")]
    Resource {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A send/recv moved fewer bytes than a full block, or the
    /// underlying primitive call reported failure.
    #[error("transfer error in {op}: {reason}")]
    Transfer { op: &'static str, reason: String },

    /// A wait on a permit failed, was interrupted, or the pair was
    /// poisoned by the peer.
    #[error("synchronization error in {op}: {reason}")]
    Synchronization { op: &'static str, reason: String },

    /// The timed window was unusable (e.g. zero elapsed time).
    #[error("measurement error: {0}")]
    Measurement(String),
}

impl Error {
    /// Resource failure capturing the current OS error.
    pub(crate) fn resource_os(op: &'static str) -> Self {
        Error::Resource {
            op,
            source: io::Error::last_os_error(),
        }
    }

    /// Transfer failure capturing the current OS error.
    pub(crate) fn transfer_os(op: &'static str) -> Self {
        Error::Transfer {
            op,
            reason: io::Error::last_os_error().to_string(),
        }
    }

    /// Synchronization failure capturing the current OS error.
    pub(crate) fn sync_os(op: &'static str) -> Self {
        Error::Synchronization {
            op,
            reason: io::Error::last_os_error().to_string(),
        }
    }
}
