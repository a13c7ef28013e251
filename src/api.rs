//! The kernel's public syscall surface (spec §4, §6).
//!
//! Every primitive here is the crate's only way in: it acquires the
//! kernel lock at entry (via [`crate::kernel::with_kernel`]) and returns
//! before an interrupt handler could observe it half-finished, the same
//! single-entry-point discipline as the teacher's `api::syscall` wrappers
//! over `sys::ipc::send`/`recv`, generalized from x86_64 `int 0x80` to a
//! plain function call since this kernel and its processes share one
//! address space (spec §1 Non-goals: no memory protection).

use crate::envelope::{Envelope, MTEXT_MAXLEN};
use crate::error::{KResult, KernelError};
use crate::kernel::{with_kernel, Kernel};
use crate::mbox::EnvelopeHandle;
use crate::process::{Pid, Priority, ProcessState, ProcessTable, NULL_PID};
use crate::sched;

/// Give up the CPU (spec §4.5). Always succeeds.
pub fn release_processor() {
    let switch = with_kernel(|k| sched::release_processor(k));
    sched::perform(switch);
}

/// Request one fixed-size memory block (spec §4.3).
///
/// Blocks the caller if the pool is exhausted, by repeatedly yielding
/// and retrying — mirrors `k_request_memory_block`'s poll loop, since
/// this kernel has no notion of a wait queue keyed on "memory became
/// available" other than re-running the ready queue.
pub fn request_memory_block() -> *mut u8 {
    loop {
        let (got, switch) = with_kernel(|k| {
            if let Some(ptr) = k.mem.request_block() {
                (Some(ptr), None)
            } else {
                let current = k.running;
                if current != NULL_PID {
                    k.procs.get_mut(current).state = ProcessState::BlockedOnResource;
                    if let Some(level) = k.procs.get(current).priority.level() {
                        k.blocked_on_resource.push(current, level);
                    }
                }
                (None, sched::block_current(k))
            }
        });
        sched::perform(switch);
        if let Some(ptr) = got {
            return ptr;
        }
    }
}

/// Return a memory block to the pool (spec §4.3).
///
/// Validates `ptr` (spec §7 `BadPointer`), then wakes every process
/// blocked on memory, highest priority first, and lets strict-priority
/// preemption decide whether one of them should run immediately —
/// grounded in `k_release_memory_block`/`k_check_preemption`'s
/// wake-all-then-compare-priority policy (spec §4.3 fairness note).
pub fn release_memory_block(ptr: *mut u8) -> KResult<()> {
    let (result, switch) = with_kernel(|k| match k.mem.release_block(ptr) {
        Ok(()) => {
            let mut woken = crate::pq::PriorityQueue::new();
            k.blocked_on_resource.drain_into(&mut woken);
            while let Some(pid) = woken.pop_highest() {
                sched::enqueue_ready(k, pid);
            }
            (Ok(()), sched::check_preemption(k))
        }
        Err(e) => (Err(e), None),
    });
    sched::perform(switch);
    result
}

fn validate_pid(pid: Pid) -> KResult<()> {
    if ProcessTable::is_valid_pid(pid) {
        Ok(())
    } else {
        Err(KernelError::BadArg)
    }
}

/// Send `mtext` to `receiver_pid` with message type `mtype` (spec §4.4).
/// Never blocks the sender: a fresh envelope is drawn from the pool the
/// same way `request_memory_block` would be, then handed straight to
/// the receiver's mailbox.
pub fn send_message(receiver_pid: Pid, mtype: u32, mtext: &[u8]) -> KResult<()> {
    validate_pid(receiver_pid)?;
    if mtext.len() > MTEXT_MAXLEN {
        return Err(KernelError::BadArg);
    }
    let ptr = request_memory_block() as *mut Envelope;
    let switch = with_kernel(|k| {
        let sender = k.running;
        let handle = unsafe {
            let env = &mut *ptr;
            *env = Envelope::empty();
            env.sender_pid = sender;
            env.receiver_pid = receiver_pid;
            env.mtype = mtype;
            env.set_mtext(mtext);
            EnvelopeHandle::from_raw(ptr)
        };
        deliver(k, receiver_pid, handle)
    });
    sched::perform(switch);
    Ok(())
}

/// Hand `handle` to `receiver_pid`'s mailbox and wake it if it was
/// blocked waiting to receive (spec §4.4's `k_send_message_helper`
/// wake + preempt-if-outranked rule).
fn deliver(k: &mut Kernel, receiver_pid: Pid, handle: EnvelopeHandle) -> sched::Switch {
    k.mailboxes.get_mut(receiver_pid).push(handle);
    if k.procs.get(receiver_pid).state == ProcessState::BlockedOnReceive {
        sched::enqueue_ready(k, receiver_pid);
    }
    sched::check_preemption(k)
}

/// Receive the next message addressed to the caller, blocking until one
/// arrives (spec §4.4). Returns `(sender_pid, mtype, mtext)`; `mtext` is
/// copied out of the envelope before the envelope's block is released
/// back to the pool.
pub fn receive_message(out: &mut [u8]) -> KResult<(Pid, u32, usize)> {
    loop {
        let (result, switch) = with_kernel(|k| {
            let current = k.running;
            if let Some(handle) = k.mailboxes.get_mut(current).pop() {
                let (sender, mtype, ptr) = unsafe {
                    let env = handle.as_ref();
                    (env.sender_pid, env.mtype, handle.as_raw())
                };
                let n = unsafe {
                    let env = handle.as_ref();
                    let text = env.mtext();
                    let n = text.len().min(out.len());
                    out[..n].copy_from_slice(&text[..n]);
                    n
                };
                let _ = k.mem.release_block(ptr as *mut u8);
                (Some((sender, mtype, n)), None)
            } else {
                k.procs.get_mut(current).state = ProcessState::BlockedOnReceive;
                (None, sched::block_current(k))
            }
        });
        sched::perform(switch);
        if let Some(r) = result {
            return Ok(r);
        }
    }
}

/// Schedule a message for delivery `delay_ms` ticks from now (spec
/// §4.4). The envelope is built immediately but held in the delayed
/// queue, not the receiver's mailbox, until its deadline expires.
pub fn delayed_send(receiver_pid: Pid, mtype: u32, mtext: &[u8], delay_ms: u32) -> KResult<()> {
    validate_pid(receiver_pid)?;
    if mtext.len() > MTEXT_MAXLEN {
        return Err(KernelError::BadArg);
    }
    let ptr = request_memory_block() as *mut Envelope;
    with_kernel(|k| {
        let sender = k.running;
        let deadline = k.tick_count.wrapping_add(delay_ms);
        let handle = unsafe {
            let env = &mut *ptr;
            *env = Envelope::empty();
            env.sender_pid = sender;
            env.receiver_pid = receiver_pid;
            env.mtype = mtype;
            env.deadline = deadline;
            env.set_mtext(mtext);
            EnvelopeHandle::from_raw(ptr)
        };
        k.delayed.insert(handle, deadline);
        Ok(())
    })
}

/// Change `pid`'s scheduling priority (spec §4.6 / §7).
///
/// `pid == NULL_PID` is only ever legal with `priority == Priority::Null`
/// (reasserting the idle process's own fixed priority is a no-op);
/// anything else targeting the null process is `NotPermitted`. For every
/// other `pid`, `priority` must be one of the four queueable levels —
/// `Priority::Null`/`Priority::Iproc` are sentinels no real process may
/// be assigned, so those are `BadArg`, not `NotPermitted`.
pub fn set_process_priority(pid: Pid, priority: Priority) -> KResult<()> {
    if pid == NULL_PID {
        if priority != Priority::Null {
            return Err(KernelError::NotPermitted);
        }
        return Ok(());
    }
    validate_pid(pid)?;
    if priority.level().is_none() {
        return Err(KernelError::BadArg);
    }
    let switch = with_kernel(|k| sched::set_process_priority(k, pid, priority));
    sched::perform(switch);
    Ok(())
}

/// Read `pid`'s current scheduling priority (spec §4.6).
pub fn get_process_priority(pid: Pid) -> KResult<Priority> {
    validate_pid(pid)?;
    Ok(with_kernel(|k| sched::get_process_priority(k, pid)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_pid_rejects_out_of_range() {
        assert!(validate_pid(0).is_ok());
        assert_eq!(validate_pid(200), Err(KernelError::BadArg));
    }

    #[test]
    fn set_process_priority_rejects_sentinel_levels_for_a_real_pid() {
        assert_eq!(
            set_process_priority(1, Priority::Null),
            Err(KernelError::BadArg)
        );
        assert_eq!(
            set_process_priority(1, Priority::Iproc),
            Err(KernelError::BadArg)
        );
    }

    #[test]
    fn set_process_priority_rejects_retargeting_the_null_process() {
        assert_eq!(
            set_process_priority(NULL_PID, Priority::Highest),
            Err(KernelError::NotPermitted)
        );
    }

    #[test]
    fn get_process_priority_rejects_bad_pid() {
        assert_eq!(get_process_priority(200), Err(KernelError::BadArg));
    }
}
