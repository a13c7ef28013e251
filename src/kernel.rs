//! The kernel's single piece of mutable state (spec §9 design note).
//!
//! Every other module (`sched`, `api`, `isr`) reaches the process table,
//! the ready/blocked queues, the memory pool, and the mailboxes through
//! one `Kernel` struct behind one lock, rather than the teacher's several
//! independent `lazy_static! RwLock<...>` globals (`PROC_TABLE`, and
//! friends) — the original C kernel (`k_process.c`) is likewise built
//! around a single translation unit's worth of static state guarded by
//! one IRQ-disable, and that's the shape this crate follows.

use spin::Mutex;

use crate::mbox::{DelayedQueue, Mailboxes};
use crate::mem::MemoryPool;
use crate::pq::PriorityQueue;
use crate::process::{Pid, ProcessTable, NULL_PID};

pub struct Kernel {
    pub procs: ProcessTable,
    pub ready: PriorityQueue,
    pub blocked_on_resource: PriorityQueue,
    pub mem: MemoryPool,
    pub mailboxes: Mailboxes,
    pub delayed: DelayedQueue,
    pub running: Pid,
    pub tick_count: u32,
    pub eager_ticks: u32,
}

impl Kernel {
    const fn new() -> Self {
        Kernel {
            procs: ProcessTable::new(),
            ready: PriorityQueue::new(),
            blocked_on_resource: PriorityQueue::new(),
            mem: MemoryPool::new(),
            mailboxes: Mailboxes::new(),
            delayed: DelayedQueue::new(),
            running: NULL_PID,
            tick_count: 0,
            eager_ticks: 0,
        }
    }
}

/// The kernel's global state, reached only through [`with_kernel`].
static KERNEL: Mutex<Kernel> = Mutex::new(Kernel::new());

/// Run `f` with exclusive access to the kernel state, interrupts
/// disabled for the duration — the kernel's one and only lock (spec §9).
/// Not reentrant: `f` must reach `sched`/queue/pool operations directly
/// through the `&mut Kernel` it's given, never by calling `with_kernel`
/// again, or the spin lock below deadlocks against itself. `api`'s
/// primitives that need two separate locked sections (e.g. drawing a
/// memory block, then depositing an envelope) take the lock twice in
/// sequence instead of nesting.
pub fn with_kernel<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    crate::arch::with_irqs_disabled(|| f(&mut KERNEL.lock()))
}

/// Populate the memory pool and process table. Called once at boot,
/// before interrupts are enabled.
pub fn init() {
    KERNEL.lock().mem.init();
}

/// A freestanding `Kernel` for unit tests, separate from the global
/// instance — `sched`/`api` tests build their own and never touch
/// [`KERNEL`], so tests can run concurrently without interfering.
#[cfg(test)]
pub(crate) fn new_for_tests() -> Kernel {
    let mut k = Kernel::new();
    k.mem.init();
    k
}
