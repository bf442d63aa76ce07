//! `DetachedTerminal`: a live terminal connection in transit between pools.

use crate::ids::TerminalId;
use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};

/// A live terminal lifted out of a pool
///
/// This is a linear resource: it is not `Clone`, and it must end in exactly
/// one of `TerminalPool::attach_terminal` or `TerminalPool::destroy_detached`.
/// Dropping an unconsumed handle is reported as a leak.
#[must_use = "a detached terminal must be attached to a pool or destroyed"]
pub struct DetachedTerminal {
    origin_id: TerminalId,
    cwd: Option<PathBuf>,
    payload: Option<Box<dyn Any + Send>>,
}

impl DetachedTerminal {
    /// Wrap a pool-specific connection payload
    pub fn new(origin_id: TerminalId, cwd: Option<PathBuf>, payload: impl Any + Send) -> Self {
        Self {
            origin_id,
            cwd,
            payload: Some(Box::new(payload)),
        }
    }

    /// Id the terminal had in its source pool (no longer valid there)
    pub fn origin_id(&self) -> TerminalId {
        self.origin_id
    }

    /// Working directory captured at detach time
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Take the pool-specific payload, consuming the handle
    ///
    /// If the payload is not a `T` the handle is returned untouched.
    pub fn into_payload<T: Any>(mut self) -> Result<T, Self> {
        match self.payload.take() {
            Some(payload) => match payload.downcast::<T>() {
                Ok(inner) => Ok(*inner),
                Err(payload) => {
                    self.payload = Some(payload);
                    Err(self)
                }
            },
            None => Err(self),
        }
    }
}

impl DetachedTerminal {
    /// Drop the connection payload without attaching it anywhere
    ///
    /// Pools call this from `destroy_detached` for payloads they cannot
    /// tear down more gracefully.
    pub fn discard(mut self) {
        self.payload.take();
    }
}

impl fmt::Debug for DetachedTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachedTerminal")
            .field("origin_id", &self.origin_id)
            .field("cwd", &self.cwd)
            .field("live", &self.payload.is_some())
            .finish()
    }
}

impl Drop for DetachedTerminal {
    fn drop(&mut self) {
        if self.payload.is_some() {
            log::error!(
                "Detached terminal {} dropped without being attached or destroyed",
                self.origin_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_payload_wrong_type_returns_handle() {
        let handle = DetachedTerminal::new(TerminalId(4), None, 42u32);
        let handle = handle.into_payload::<String>().unwrap_err();
        assert_eq!(handle.origin_id(), TerminalId(4));
        assert_eq!(handle.into_payload::<u32>().unwrap(), 42);
    }
}
