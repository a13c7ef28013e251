//! Process control block and table (spec §3, §6).
//!
//! No heap: the process set is fixed at build time, one [`Pcb`] per slot
//! in a flat `[Pcb; MAX_PROCESSES]` array, the same way the teacher's
//! `PROC_TABLE` is a fixed-size array — minus the `Box`/`RwLock`, since
//! every access here already runs under the kernel's own IRQ lock.

use crate::config::{MAX_PROCESSES, STACK_WORDS};

/// Process identifier: an index into the process table.
pub type Pid = u8;

/// `NULL` process: always runnable, never blocks, soaks up idle time
/// (spec §3). It occupies slot 0.
pub const NULL_PID: Pid = 0;

/// Priority levels (spec §6). `Null` and `Iproc` are sentinels that
/// never appear in a [`crate::pq::PriorityQueue`] — `Null` is the
/// idle process's fixed priority, `Iproc` marks code running on behalf
/// of an interrupt handler, which always preempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Priority {
    Highest = 0,
    Medium = 1,
    Low = 2,
    Lowest = 3,
    Null = 4,
    Iproc = 5,
}

impl Priority {
    /// `None` for the two sentinels, which never index a priority queue.
    pub const fn level(self) -> Option<usize> {
        match self {
            Priority::Highest => Some(0),
            Priority::Medium => Some(1),
            Priority::Low => Some(2),
            Priority::Lowest => Some(3),
            Priority::Null | Priority::Iproc => None,
        }
    }

    pub const fn from_u8(v: u8) -> Option<Priority> {
        match v {
            0 => Some(Priority::Highest),
            1 => Some(Priority::Medium),
            2 => Some(Priority::Low),
            3 => Some(Priority::Lowest),
            4 => Some(Priority::Null),
            5 => Some(Priority::Iproc),
            _ => None,
        }
    }
}

/// Scheduling state of a process (spec §3, §4.5).
///
/// `BlockedOnReceive` carries no queue of its own: a process waiting on
/// `receive_message` is found by scanning the process table for this
/// state, matching the original's mailbox-only bookkeeping (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Run,
    BlockedOnResource,
    BlockedOnReceive,
}

/// One process control block.
#[derive(Clone, Copy)]
pub struct Pcb {
    pub pid: Pid,
    pub priority: Priority,
    pub state: ProcessState,
    pub stack_pointer: u32,
    pub entry_point: u32,
    pub stack: [u32; STACK_WORDS],
}

impl Pcb {
    pub const fn unused(pid: Pid) -> Self {
        Pcb {
            pid,
            priority: Priority::Null,
            state: ProcessState::New,
            stack_pointer: 0,
            entry_point: 0,
            stack: [0; STACK_WORDS],
        }
    }

    /// Lay down a synthetic initial stack frame for a process that has
    /// never run (spec §2 `init`, §4.5 `context_switch`'s `NEW` branch).
    ///
    /// The frame is shaped exactly like what
    /// [`crate::arch::ContextSwitch::save_current_sp`] would have left
    /// behind had this process actually called it: eight callee-saved
    /// registers (zeroed — they're never read before this process's own
    /// prologue overwrites them) followed by a saved link register set
    /// to `entry_point`. First dispatch therefore runs through the exact
    /// same restore path as any other switch and lands on `entry_point`
    /// instead of a resume point.
    pub fn spawn(&mut self, priority: Priority, entry_point: u32) {
        self.priority = priority;
        self.entry_point = entry_point;
        self.state = ProcessState::New;
        let top = self.stack.len();
        for word in &mut self.stack[top - 9..top - 1] {
            *word = 0; // r4-r11
        }
        self.stack[top - 1] = entry_point; // lr
        self.stack_pointer = &self.stack[top - 9] as *const u32 as u32;
    }
}

/// The fixed process table, one slot per [`Pid`].
pub struct ProcessTable {
    procs: [Pcb; MAX_PROCESSES],
}

impl ProcessTable {
    pub const fn new() -> Self {
        let mut procs = [Pcb::unused(0); MAX_PROCESSES];
        let mut i = 0;
        while i < MAX_PROCESSES {
            procs[i].pid = i as Pid;
            i += 1;
        }
        ProcessTable { procs }
    }

    pub fn get(&self, pid: Pid) -> &Pcb {
        &self.procs[pid as usize]
    }

    pub fn get_mut(&mut self, pid: Pid) -> &mut Pcb {
        &mut self.procs[pid as usize]
    }

    pub fn is_valid_pid(pid: Pid) -> bool {
        (pid as usize) < MAX_PROCESSES
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.procs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pcb> {
        self.procs.iter_mut()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_assigns_pid_per_slot() {
        let table = ProcessTable::new();
        for (i, pcb) in table.iter().enumerate() {
            assert_eq!(pcb.pid as usize, i);
            assert_eq!(pcb.priority, Priority::Null);
            assert_eq!(pcb.state, ProcessState::New);
        }
    }

    #[test]
    fn priority_level_maps_queueable_levels_only() {
        assert_eq!(Priority::Highest.level(), Some(0));
        assert_eq!(Priority::Lowest.level(), Some(3));
        assert_eq!(Priority::Null.level(), None);
        assert_eq!(Priority::Iproc.level(), None);
    }

    #[test]
    fn is_valid_pid_respects_table_bounds() {
        assert!(ProcessTable::is_valid_pid(0));
        assert!(ProcessTable::is_valid_pid((MAX_PROCESSES - 1) as Pid));
        assert!(!ProcessTable::is_valid_pid(MAX_PROCESSES as Pid));
    }
}
