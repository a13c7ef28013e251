//! Kernel error taxonomy (spec §7).

use core::fmt;

/// Errors returned synchronously to the calling process. Never signalled
/// asynchronously — see spec §7 propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// Out-of-range PID, out-of-range priority, or a null envelope.
    BadArg,
    /// `release_memory_block` given a pointer that isn't pool-aligned,
    /// is out of range, or names an already-free block.
    BadPointer,
    /// Attempted to change the null process off `NULL_PRIO`.
    NotPermitted,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            KernelError::BadArg => "bad argument",
            KernelError::BadPointer => "bad memory block pointer",
            KernelError::NotPermitted => "operation not permitted",
        };
        f.write_str(msg)
    }
}

pub type KResult<T> = Result<T, KernelError>;
