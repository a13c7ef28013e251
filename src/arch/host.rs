//! Host stand-in backend used by `cargo test`.
//!
//! There's no real stack to switch on the developer's machine, so
//! `save_current_sp` just returns a distinguishable token instead of a
//! real saved context, and `sched::perform` (the only thing that would
//! ever call `dispatch_sp`) is itself compiled out on this target —
//! `dispatch_sp` exists only to satisfy the trait and is never reached.
//! IRQ-disable is a plain re-entrant counter: nothing here can actually
//! be interrupted, but the nesting behavior the kernel relies on is
//! still exercised.

use core::sync::atomic::{AtomicU32, Ordering};

use super::ContextSwitch;

static IRQ_DEPTH: AtomicU32 = AtomicU32::new(0);

pub fn with_irqs_disabled<R>(f: impl FnOnce() -> R) -> R {
    IRQ_DEPTH.fetch_add(1, Ordering::SeqCst);
    let result = f();
    IRQ_DEPTH.fetch_sub(1, Ordering::SeqCst);
    result
}

static FAKE_SP: AtomicU32 = AtomicU32::new(0);

pub struct ArchImpl;

impl ContextSwitch for ArchImpl {
    fn save_current_sp() -> u32 {
        FAKE_SP.fetch_add(1, Ordering::SeqCst)
    }

    fn dispatch_sp(_sp: u32) -> ! {
        panic!("host backend cannot actually dispatch a stack");
    }
}
