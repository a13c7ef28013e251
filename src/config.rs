//! Compile-time kernel tunables.
//!
//! Everything here is a `pub const` rather than a runtime-loaded value:
//! the process set, the memory pool, and the priority levels are all
//! fixed at build time (spec §1, §3).

/// Number of fixed-size memory blocks in the pool.
pub const NUM_BLOCKS: usize = 30;

/// Size in bytes of one memory block. 8-byte aligned, large enough to
/// hold one [`crate::envelope::Envelope`].
pub const BLOCK_SIZE: usize = 128;

/// Number of priority levels that actually queue (`HIGHEST..=LOWEST`).
/// `NULL_PRIO` and `IPROC_PRIO` are sentinels, never queued.
pub const NUM_PRIORITIES: usize = 4;

/// Maximum number of process control blocks, including `NULL` at index 0.
pub const MAX_PROCESSES: usize = 16;

/// Per-process stack size in 32-bit words.
pub const STACK_WORDS: usize = 256;

/// Timer tick period, nominally 1 ms (spec §3 `tick_count`).
pub const TICK_MS: u32 = 1;

/// Round-robin window within a priority level: `check_preemption_eager`
/// runs every this many ticks (spec §4.5).
pub const SCHED_EAGER_TICKS: u32 = 100;

/// Input ring capacity for one UART line (spec §4.7).
pub const UART_INPUT_RING: usize = 128;

/// Output ring capacity for UART TX (spec §4.7).
pub const UART_OUTPUT_RING: usize = 256;
