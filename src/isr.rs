//! Interrupt service routines (spec §4.7, §5).
//!
//! Everything here runs at `Iproc` priority (spec §3): an ISR never
//! blocks, it only ever enqueues work and lets the next
//! `check_preemption`/`check_preemption_eager` decide who runs when it
//! returns. Grounded in the teacher's `sys::clk`/`sys::pic` tick counter
//! and the UART ring buffers the original's `uart_irq.c`/`usr_clock.c`
//! family builds on.

use crate::config::{MAX_PROCESSES, SCHED_EAGER_TICKS};
use crate::envelope::Envelope;
use crate::kernel::{with_kernel, Kernel};
use crate::mbox::EnvelopeHandle;
use crate::process::{Pid, ProcessState};
use crate::sched;

/// Reserved PIDs (spec §6).
const PID_KCD: Pid = 12;
const PID_CRT: Pid = 13;
const PID_UART_IPROC: Pid = 15;

/// Reserved message types (spec §6).
const MTYPE_DEFAULT: u32 = 0;

/// Timer tick handler (spec §5): advance `tick_count`, deliver any
/// delayed sends whose deadline has arrived, then run the eager
/// round-robin check every `SCHED_EAGER_TICKS` ticks.
pub fn on_timer_tick() {
    let switch = with_kernel(|k| {
        k.tick_count = k.tick_count.wrapping_add(1);
        expire_delayed(k, k.tick_count);
        k.eager_ticks = k.eager_ticks.wrapping_add(1);
        if k.eager_ticks >= SCHED_EAGER_TICKS {
            k.eager_ticks = 0;
            sched::check_preemption_eager(k)
        } else {
            sched::check_preemption(k)
        }
    });
    sched::perform(switch);
}

/// Deliver every envelope in the delayed queue whose deadline is `<=
/// now` to its receiver's mailbox (spec §4.4 `tick_expire`). ISR-safe:
/// never blocks.
fn expire_delayed(k: &mut Kernel, now: u32) {
    let mut due: [Option<EnvelopeHandle>; MAX_PROCESSES] = [None; MAX_PROCESSES];
    let mut due_len = 0;
    k.delayed.expire(now, |handle| {
        if due_len < due.len() {
            due[due_len] = Some(handle);
            due_len += 1;
        }
    });
    for slot in due.iter_mut().take(due_len) {
        if let Some(handle) = slot.take() {
            let receiver = unsafe { handle.as_ref().receiver_pid };
            k.mailboxes.get_mut(receiver).push(handle);
            if k.procs.get(receiver).state == ProcessState::BlockedOnReceive {
                sched::enqueue_ready(k, receiver);
            }
        }
    }
}

/// `send_raw` (spec §4.7): the ISR-safe, non-blocking counterpart to
/// [`crate::api::send_message`]. If the pool is exhausted the
/// notification is silently dropped — an ISR may never do what
/// `request_memory_block` normally does and block.
fn send_raw(
    k: &mut Kernel,
    sender: Pid,
    receiver: Pid,
    mtype: u32,
    mtext: &[u8],
) -> sched::Switch {
    let ptr = match k.mem.request_block() {
        Some(p) => p as *mut Envelope,
        None => return None,
    };
    let handle = unsafe {
        let env = &mut *ptr;
        *env = Envelope::empty();
        env.sender_pid = sender;
        env.receiver_pid = receiver;
        env.mtype = mtype;
        env.set_mtext(mtext);
        EnvelopeHandle::from_raw(ptr)
    };
    k.mailboxes.get_mut(receiver).push(handle);
    if k.procs.get(receiver).state == ProcessState::BlockedOnReceive {
        sched::enqueue_ready(k, receiver);
    }
    sched::check_preemption(k)
}

/// UART receive handler (spec §4.7): echo every byte, notify KCD on
/// carriage return, and buffer the byte into the input ring — except
/// for hot-key bytes, which are consumed here and invoke a debug
/// printer instead of ever reaching a process.
pub fn on_uart_rx(byte: u8) {
    match byte {
        b'!' => {
            crate::debug::dump_ready_queue();
            return;
        }
        b'@' => {
            crate::debug::dump_blocked_on_resource_queue();
            return;
        }
        b'#' => {
            crate::debug::dump_blocked_on_receive();
            return;
        }
        _ => {}
    }
    crate::uart::tx_push(byte);
    if byte == b'\r' {
        let switch = with_kernel(|k| send_raw(k, PID_UART_IPROC, PID_KCD, MTYPE_DEFAULT, &[]));
        sched::perform(switch);
    }
    crate::uart::rx_push(byte);
}

/// UART transmit-empty handler (spec §4.7): pull the next queued output
/// byte, if any, and write it to the data register. When the ring has
/// just drained, disable the transmit-empty interrupt so it stops
/// firing on an empty buffer, and notify CRT the same way
/// `uart_pop_output_char` notifies `PID_CRT` in `uart_irq.c` once its
/// output buffer empties.
pub fn on_uart_tx_empty() {
    if crate::uart::tx_pump().is_none() {
        crate::uart::disable_tx_irq();
        let switch = with_kernel(|k| send_raw(k, PID_UART_IPROC, PID_CRT, MTYPE_DEFAULT, &[]));
        sched::perform(switch);
    }
}
