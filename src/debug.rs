//! Debug hot-key dumps (spec §4.7, §6), triggered from
//! [`crate::isr::on_uart_rx`]: `!` ready queue, `@` blocked-on-resource
//! queue, `#` blocked-on-receive processes.
//!
//! Grounded in the original's own debug dump commands over the ready and
//! blocked queues; printed through [`crate::klog`] rather than a
//! dedicated CRT process, since these fire from interrupt context and
//! must never block on a mailbox send.

use crate::config::NUM_PRIORITIES;
use crate::kernel::with_kernel;
use crate::klog;
use crate::process::ProcessState;

pub fn dump_ready_queue() {
    with_kernel(|k| {
        klog!("ready queue:");
        for level in 0..NUM_PRIORITIES {
            k.ready.dump_level(level, |pid| klog!("  level {}: pid {}", level, pid));
        }
    });
}

pub fn dump_blocked_on_resource_queue() {
    with_kernel(|k| {
        klog!("blocked-on-resource queue:");
        for level in 0..NUM_PRIORITIES {
            k.blocked_on_resource
                .dump_level(level, |pid| klog!("  level {}: pid {}", level, pid));
        }
    });
}

/// Processes blocked on receive sit in no queue (spec §3 invariant 4);
/// find them by scanning the process table.
pub fn dump_blocked_on_receive() {
    with_kernel(|k| {
        klog!("blocked-on-receive processes:");
        for pcb in k.procs.iter() {
            if pcb.state == ProcessState::BlockedOnReceive {
                klog!("  pid {}", pcb.pid);
            }
        }
    });
}
