//! `pq` — priority queue of PIDs (spec §4.2).
//!
//! One [`Ring`] per priority level; front of level 0 is the highest
//! priority runnable PID. Every operation is O(`NUM_PRIORITIES`).

use crate::config::NUM_PRIORITIES;
use crate::process::Pid;
use crate::ring::Ring;

/// A PID ring buffer large enough to hold every process exactly once.
const CAPACITY: usize = crate::config::MAX_PROCESSES;

pub struct PriorityQueue {
    queues: [Ring<Pid, CAPACITY>; NUM_PRIORITIES],
}

impl PriorityQueue {
    pub const fn new() -> Self {
        const EMPTY: Ring<Pid, CAPACITY> = Ring::new();
        PriorityQueue {
            queues: [EMPTY; NUM_PRIORITIES],
        }
    }

    pub fn push(&mut self, pid: Pid, prio: usize) {
        self.queues[prio].push_back(pid);
    }

    /// Pop the front PID of the highest non-empty priority level.
    pub fn pop_highest(&mut self) -> Option<Pid> {
        for level in self.queues.iter_mut() {
            if !level.is_empty() {
                return Some(level.pop_front());
            }
        }
        None
    }

    /// Peek the highest-priority head without removing it.
    pub fn peek_highest(&self) -> Option<(Pid, usize)> {
        for (prio, level) in self.queues.iter().enumerate() {
            if let Some(pid) = level.front() {
                return Some((pid, prio));
            }
        }
        None
    }

    /// Remove every occurrence of `pid` at `from` and push it at the
    /// back of `to`. No-op if `pid` wasn't actually queued at `from`.
    pub fn change_priority(&mut self, pid: Pid, from: usize, to: usize) {
        let removed = self.queues[from].remove(pid);
        if removed > 0 {
            self.queues[to].push_back(pid);
        }
    }

    /// Find `pid` in `self` (at any level), remove it, and push it at
    /// the back of `other` at the same level.
    pub fn move_to(&mut self, other: &mut PriorityQueue, pid: Pid) {
        for prio in 0..NUM_PRIORITIES {
            if self.queues[prio].remove(pid) > 0 {
                other.queues[prio].push_back(pid);
                return;
            }
        }
    }

    /// Append everything in `self` onto `other`, level by level, and
    /// empty `self`. Used when a released memory block wakes every
    /// resource-blocked waiter in priority order (spec §4.3 fairness).
    pub fn drain_into(&mut self, other: &mut PriorityQueue) {
        for prio in 0..NUM_PRIORITIES {
            self.queues[prio].drain_into(&mut other.queues[prio]);
        }
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queues.iter().any(|level| level.contains(pid))
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|level| level.is_empty())
    }

    /// Snapshot of one level's PIDs, front to back. Used by the debug
    /// hot-key dumps (spec §4.7/§6).
    pub fn dump_level(&self, prio: usize, mut f: impl FnMut(Pid)) {
        self.queues[prio].foreach(&mut f);
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_highest_priority_first() {
        let mut pq = PriorityQueue::new();
        pq.push(5, 3);
        pq.push(2, 0);
        pq.push(3, 1);
        assert_eq!(pq.pop_highest(), Some(2));
        assert_eq!(pq.pop_highest(), Some(3));
        assert_eq!(pq.pop_highest(), Some(5));
        assert_eq!(pq.pop_highest(), None);
    }

    #[test]
    fn fifo_within_a_level() {
        let mut pq = PriorityQueue::new();
        pq.push(1, 3);
        pq.push(2, 3);
        pq.push(3, 3);
        assert_eq!(pq.pop_highest(), Some(1));
        assert_eq!(pq.pop_highest(), Some(2));
        assert_eq!(pq.pop_highest(), Some(3));
    }

    #[test]
    fn change_priority_moves_pid_to_back_of_new_level() {
        let mut pq = PriorityQueue::new();
        pq.push(1, 2);
        pq.push(2, 2);
        pq.change_priority(1, 2, 0);
        assert_eq!(pq.peek_highest(), Some((1, 0)));
        assert!(!pq.contains(1) || pq.peek_highest() == Some((1, 0)));
    }

    #[test]
    fn move_to_preserves_level() {
        let mut from = PriorityQueue::new();
        let mut to = PriorityQueue::new();
        from.push(7, 1);
        from.move_to(&mut to, 7);
        assert!(!from.contains(7));
        assert_eq!(to.peek_highest(), Some((7, 1)));
    }

    #[test]
    fn drain_into_wakes_all_waiters_in_priority_order() {
        let mut blocked = PriorityQueue::new();
        let mut ready = PriorityQueue::new();
        blocked.push(10, 3);
        blocked.push(11, 0);
        blocked.push(12, 1);
        blocked.drain_into(&mut ready);
        assert!(blocked.is_empty());
        assert_eq!(ready.pop_highest(), Some(11));
        assert_eq!(ready.pop_highest(), Some(12));
        assert_eq!(ready.pop_highest(), Some(10));
    }
}
