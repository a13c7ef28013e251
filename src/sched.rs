//! Scheduler (spec §4.5), grounded in `k_process.c`'s `scheduler`,
//! `process_switch`, `k_release_processor`, and `k_check_preemption`.
//!
//! Strict priority with FIFO ordering within a level; the eager
//! round-robin tie-break only applies when `check_preemption_eager`
//! fires, every [`crate::config::SCHED_EAGER_TICKS`] ticks (spec §4.5).

use crate::arch::{Arch, ContextSwitch};
use crate::kernel::Kernel;
use crate::process::{Pid, Priority, ProcessState, NULL_PID};

/// The stack pointer to dispatch once the kernel's lock has been
/// dropped, or `None` if the running process didn't change.
///
/// Every `sched` function that might need to switch the CPU returns one
/// of these instead of dispatching directly: `dispatch_sp` never returns
/// on the real target, and every caller here runs inside
/// `kernel::with_kernel`'s `interrupt::free`-held `spin::Mutex` guard.
/// Calling a diverging `dispatch_sp` from inside that closure would skip
/// the guard's drop and leave interrupts masked forever — the very next
/// kernel entry would deadlock on its own lock. Instead, `with_kernel`
/// is left to return normally (dropping the guard, restoring IRQ state)
/// carrying a `Switch`, and only then does the caller hand it to
/// [`perform`], which does the actual dispatch outside the lock.
pub type Switch = Option<u32>;

/// Move `pid` onto the back of its priority level's ready queue and mark
/// it `Ready`. No-op for the null process, which is never queued.
pub fn enqueue_ready(k: &mut Kernel, pid: Pid) {
    if pid == NULL_PID {
        return;
    }
    let prio = k.procs.get(pid).priority;
    if let Some(level) = prio.level() {
        k.procs.get_mut(pid).state = ProcessState::Ready;
        k.ready.push(pid, level);
    }
}

/// Pop the next process to run: the front of the highest non-empty
/// ready level, or the null process if nothing is ready.
fn pop_next_ready(k: &mut Kernel) -> Pid {
    k.ready.pop_highest().unwrap_or(NULL_PID)
}

/// Switch the CPU from `k.running` to `next`. The caller is responsible
/// for having already requeued the outgoing process (if it's still
/// runnable) before calling this — `switch_to` only saves the outgoing
/// context and installs `next` as the new running process, returning
/// the stack pointer [`perform`] must dispatch.
///
/// A `next` still in [`ProcessState::New`] (never run before) takes the
/// exact same path: [`crate::process::Pcb::spawn`] already laid down a
/// synthetic saved context shaped like any other, so there's no separate
/// restore mechanism to invoke here, just a log line marking the first
/// run.
fn switch_to(k: &mut Kernel, next: Pid) -> Switch {
    let current = k.running;
    if current == next {
        k.procs.get_mut(next).state = ProcessState::Run;
        return None;
    }
    let saved_sp = if current != NULL_PID {
        Some(Arch::save_current_sp())
    } else {
        None
    };
    if let Some(sp) = saved_sp {
        k.procs.get_mut(current).stack_pointer = sp;
    }
    if k.procs.get(next).state == ProcessState::New {
        crate::klog!("sched: first dispatch of pid {}", next);
    }
    k.procs.get_mut(next).state = ProcessState::Run;
    k.running = next;
    Some(k.procs.get(next).stack_pointer)
}

/// `release_processor` (spec §4.5 / §6): the running process voluntarily
/// gives up the CPU. It goes back onto the ready queue at its own
/// priority and the highest-priority ready process (possibly itself)
/// runs next.
pub fn release_processor(k: &mut Kernel) -> Switch {
    let current = k.running;
    if current != NULL_PID {
        enqueue_ready(k, current);
    }
    let next = pop_next_ready(k);
    switch_to(k, next)
}

/// Give up the CPU without requeueing the outgoing process anywhere
/// (spec §4.5 `yield()`'s "blocked-on-receive → no queue" case). Used
/// when the caller has already transitioned itself to
/// `BlockedOnResource` (and pushed itself onto that queue) or to
/// `BlockedOnReceive` (which sits in no queue at all) before asking to
/// be switched out.
pub fn block_current(k: &mut Kernel) -> Switch {
    let next = pop_next_ready(k);
    switch_to(k, next)
}

/// Strict-priority preemption check (spec §4.5): if the highest-priority
/// ready process outranks the one currently running, switch to it now.
/// Called after any state change that might have made a higher-priority
/// process ready — releasing a memory block, sending a message, raising
/// a process's own priority.
pub fn check_preemption(k: &mut Kernel) -> Switch {
    let current_prio = k.procs.get(k.running).priority;
    let current_level = current_prio.level().unwrap_or(usize::MAX);
    if let Some((_, top_level)) = k.ready.peek_highest() {
        if top_level < current_level {
            let next = pop_next_ready(k);
            let current = k.running;
            if current != NULL_PID {
                enqueue_ready(k, current);
            }
            return switch_to(k, next);
        }
    }
    None
}

/// Eager round-robin tie-break (spec §4.5): every `SCHED_EAGER_TICKS`
/// ticks, if another ready process shares the running process's
/// priority level, rotate to it even though strict priority alone
/// wouldn't preempt.
pub fn check_preemption_eager(k: &mut Kernel) -> Switch {
    let current = k.running;
    if current == NULL_PID {
        return check_preemption(k);
    }
    let current_prio = k.procs.get(current).priority;
    let level = match current_prio.level() {
        Some(l) => l,
        None => return None,
    };
    if let Some((_, top_level)) = k.ready.peek_highest() {
        if top_level <= level {
            let next = pop_next_ready(k);
            enqueue_ready(k, current);
            return switch_to(k, next);
        }
    }
    None
}

/// `set_process_priority` (spec §4.6 / §6).
///
/// The special case `pid == NULL_PID` is a deliberate no-op (grounded in
/// `k_set_process_priority`'s own `pid == NULL_PID && priority ==
/// NULL_PRIO` short-circuit): nothing in the reference workloads ever
/// legitimately reprioritizes the idle process, so this just accepts
/// and ignores it rather than erroring. Rejecting any other combination
/// is handled by the caller ([`crate::api::set_process_priority`])
/// before this is ever reached.
pub fn set_process_priority(k: &mut Kernel, pid: Pid, new_prio: Priority) -> Switch {
    if pid == NULL_PID {
        return None;
    }
    let old_level = k.procs.get(pid).priority.level();
    k.procs.get_mut(pid).priority = new_prio;
    let new_level = new_prio.level();
    match (k.procs.get(pid).state, old_level, new_level) {
        (ProcessState::Ready, Some(from), Some(to)) if from != to => {
            k.ready.change_priority(pid, from, to);
        }
        (ProcessState::BlockedOnResource, Some(from), Some(to)) if from != to => {
            k.blocked_on_resource.change_priority(pid, from, to);
        }
        _ => {}
    }
    check_preemption(k)
}

/// Create a process at boot (spec §2 `init`): build its initial stack
/// frame and drop it onto the ready queue without going through
/// [`enqueue_ready`]'s state check, since a freshly spawned process is
/// `New`, not `Ready`, until [`start`] or a later switch actually runs
/// it — matching `process_create`'s own "every process starts life on
/// the ready queue" boot-time behavior in `k_process.c`.
pub fn create_process(k: &mut Kernel, pid: Pid, priority: Priority, entry_point: u32) {
    k.procs.get_mut(pid).spawn(priority, entry_point);
    if let Some(level) = priority.level() {
        k.procs.get_mut(pid).state = ProcessState::Ready;
        k.ready.push(pid, level);
    }
}

/// Pick the first process to run at boot, once every process image has
/// been created by [`create_process`]. The null process is `k.running`
/// by construction until this runs.
pub fn start(k: &mut Kernel) -> Switch {
    let next = pop_next_ready(k);
    switch_to(k, next)
}

/// Actually dispatch a pending [`Switch`], if any. Must only be called
/// once the kernel's lock has already been dropped — never from inside
/// `kernel::with_kernel`'s closure. On the host test target this is a
/// no-op: there's no real stack to jump to, and nothing ever constructs
/// a `Some` `Switch` that would need dispatching there either, since
/// `Arch::save_current_sp` on that backend never represents a real
/// resumable context.
pub fn perform(switch: Switch) {
    #[cfg(target_arch = "arm")]
    if let Some(sp) = switch {
        Arch::dispatch_sp(sp);
    }
    #[cfg(not(target_arch = "arm"))]
    let _ = switch;
}

pub fn get_process_priority(k: &Kernel, pid: Pid) -> Priority {
    k.procs.get(pid).priority
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Kernel {
        crate::kernel::new_for_tests()
    }

    fn ready_process(k: &mut Kernel, pid: Pid, prio: Priority) {
        k.procs.get_mut(pid).priority = prio;
        k.procs.get_mut(pid).state = ProcessState::New;
        enqueue_ready(k, pid);
    }

    #[test]
    fn release_processor_requeues_self_and_picks_highest() {
        let mut k = fresh();
        k.running = 1;
        k.procs.get_mut(1).priority = Priority::Medium;
        k.procs.get_mut(1).state = ProcessState::Run;
        ready_process(&mut k, 2, Priority::Highest);
        release_processor(&mut k);
        assert_eq!(k.running, 2);
        assert!(k.ready.contains(1));
    }

    #[test]
    fn check_preemption_switches_when_higher_priority_ready() {
        let mut k = fresh();
        k.running = 1;
        k.procs.get_mut(1).priority = Priority::Lowest;
        k.procs.get_mut(1).state = ProcessState::Run;
        ready_process(&mut k, 2, Priority::Highest);
        check_preemption(&mut k);
        assert_eq!(k.running, 2);
    }

    #[test]
    fn check_preemption_no_op_when_current_already_highest() {
        let mut k = fresh();
        k.running = 1;
        k.procs.get_mut(1).priority = Priority::Highest;
        k.procs.get_mut(1).state = ProcessState::Run;
        ready_process(&mut k, 2, Priority::Lowest);
        check_preemption(&mut k);
        assert_eq!(k.running, 1);
    }

    #[test]
    fn set_process_priority_moves_ready_pid_between_levels() {
        let mut k = fresh();
        k.running = NULL_PID;
        ready_process(&mut k, 1, Priority::Lowest);
        set_process_priority(&mut k, 1, Priority::Highest);
        assert_eq!(k.procs.get(1).priority, Priority::Highest);
        assert_eq!(k.ready.peek_highest(), Some((1, 0)));
    }

    #[test]
    fn set_process_priority_on_null_pid_is_a_no_op() {
        let mut k = fresh();
        let before = k.procs.get(NULL_PID).priority;
        set_process_priority(&mut k, NULL_PID, Priority::Highest);
        assert_eq!(k.procs.get(NULL_PID).priority, before);
    }
}
