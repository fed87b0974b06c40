// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Caller-driven cancellation.
//!
//! [`CancelToken`] is a cloneable flag the caller passes via the options and
//! may trip from another thread. The pipeline checks it at natural
//! boundaries (around key derivation, before the PNG re-encode) and returns
//! [`StegoError::Cancelled`]. Key material allocated before the check is
//! zeroed on that path like on every other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::stego::error::StegoError;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the operation holding a clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Check for cancellation, returning an error if requested.
    pub fn check(&self) -> Result<(), StegoError> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }
}
