//! Mailboxes and the delayed-send queue (spec §4.4).
//!
//! A mailbox is a per-process FIFO of envelope handles — a raw pointer
//! into a [`crate::mem::Block`], cast to `*mut Envelope` (spec §9: the
//! envelope is overlaid directly onto pool memory, so "enqueueing a
//! message" never copies more than a pointer). The delayed-send queue is
//! a single global ring kept in deadline order, grounded in
//! `message_queue.c`'s insertion-sort-on-insert design — except ties
//! break FIFO (spec §4.4), not the original's `>=` placement.

use crate::config::MAX_PROCESSES;
use crate::envelope::Envelope;
use crate::process::Pid;
use crate::ring::Ring;

/// Capacity of one process's mailbox: a ring of envelope pointers sized
/// to the whole memory pool (spec §4.4), since every envelope a process
/// can be holding came out of that same pool — a receiver slow to call
/// `receive_message` can legally accumulate up to `NUM_BLOCKS` pending
/// envelopes before the pool itself is exhausted, and the mailbox must
/// never overflow before that happens.
const MAILBOX_CAPACITY: usize = crate::config::NUM_BLOCKS;

/// A handle to an envelope living in pool memory. Never dereferenced
/// except through [`EnvelopeHandle::as_ref`]/[`as_mut`], both unsafe:
/// validity is guaranteed only by the pool's own allocation discipline.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHandle(*mut Envelope);

// Safety: the pointee only ever moves between mailboxes/the delayed
// queue under the kernel's single IRQ lock (spec §9); there is no real
// concurrent access on a single-core target for this to race with.
unsafe impl Send for EnvelopeHandle {}
unsafe impl Sync for EnvelopeHandle {}

impl EnvelopeHandle {
    /// # Safety
    /// `ptr` must point to a live `Envelope` inside a block this handle's
    /// owner holds exclusive access to.
    pub unsafe fn from_raw(ptr: *mut Envelope) -> Self {
        EnvelopeHandle(ptr)
    }

    pub fn as_raw(self) -> *mut Envelope {
        self.0
    }

    /// # Safety
    /// See [`from_raw`](Self::from_raw).
    pub unsafe fn as_ref(&self) -> &Envelope {
        &*self.0
    }

    /// # Safety
    /// See [`from_raw`](Self::from_raw).
    pub unsafe fn as_mut(&mut self) -> &mut Envelope {
        &mut *self.0
    }
}

pub struct Mailbox {
    inner: Ring<EnvelopeHandle, MAILBOX_CAPACITY>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Mailbox { inner: Ring::new() }
    }

    pub fn push(&mut self, h: EnvelopeHandle) {
        self.inner.push_back(h);
    }

    pub fn pop(&mut self) -> Option<EnvelopeHandle> {
        if self.inner.is_empty() {
            None
        } else {
            Some(self.inner.pop_front())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// One mailbox per process, indexed by [`Pid`].
pub struct Mailboxes {
    boxes: [Mailbox; MAX_PROCESSES],
}

impl Mailboxes {
    pub const fn new() -> Self {
        const EMPTY: Mailbox = Mailbox::new();
        Mailboxes {
            boxes: [EMPTY; MAX_PROCESSES],
        }
    }

    pub fn get_mut(&mut self, pid: Pid) -> &mut Mailbox {
        &mut self.boxes[pid as usize]
    }
}

impl Default for Mailboxes {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacity of the global delayed-send queue: one slot per process is
/// already generous, since a process has at most one outstanding
/// `delayed_send` worth waiting on in the reference workloads (spec §4.4
/// doesn't bound this further, so we size it like the original's static
/// array).
const DELAYED_CAPACITY: usize = MAX_PROCESSES;

/// One pending delayed delivery: an envelope plus the tick it becomes
/// due.
#[derive(Clone, Copy)]
struct Delayed {
    handle: EnvelopeHandle,
    deadline: u32,
}

/// Single global time-ordered queue of delayed sends (spec §4.4).
///
/// Kept sorted ascending by `deadline` at insertion time so `expire` is
/// a simple peek-and-pop-while loop; equal deadlines keep insertion
/// order (FIFO), matching spec §4.4's explicit tie-break rule.
pub struct DelayedQueue {
    slots: [Option<Delayed>; DELAYED_CAPACITY],
    len: usize,
}

impl DelayedQueue {
    pub const fn new() -> Self {
        DelayedQueue {
            slots: [None; DELAYED_CAPACITY],
            len: 0,
        }
    }

    /// Insert `handle`, due at `deadline`. Panics if the queue is full —
    /// a programmer error, like [`Ring`]'s overflow.
    pub fn insert(&mut self, handle: EnvelopeHandle, deadline: u32) {
        assert!(self.len < DELAYED_CAPACITY, "delayed queue: overflow");
        let mut pos = self.len;
        while pos > 0 {
            let prev = self.slots[pos - 1].expect("delayed queue: hole inside logical length");
            if prev.deadline <= deadline {
                break;
            }
            self.slots[pos] = Some(prev);
            pos -= 1;
        }
        self.slots[pos] = Some(Delayed { handle, deadline });
        self.len += 1;
    }

    /// Remove and return every envelope whose deadline is `<= now`, in
    /// deadline (then insertion) order. Called once per tick from the
    /// timer ISR (spec §5).
    pub fn expire(&mut self, now: u32, mut deliver: impl FnMut(EnvelopeHandle)) {
        let mut taken = 0;
        while taken < self.len {
            let due = self.slots[taken].expect("delayed queue: hole inside logical length");
            if due.deadline > now {
                break;
            }
            taken += 1;
        }
        for i in 0..taken {
            deliver(self.slots[i].take().expect("delayed queue: hole").handle);
        }
        for i in taken..self.len {
            self.slots[i - taken] = self.slots[i].take();
        }
        self.len -= taken;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for DelayedQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(addr: usize) -> EnvelopeHandle {
        unsafe { EnvelopeHandle::from_raw(addr as *mut Envelope) }
    }

    #[test]
    fn mailbox_is_fifo() {
        let mut mb = Mailbox::new();
        mb.push(handle(1));
        mb.push(handle(2));
        assert_eq!(mb.pop().unwrap().as_raw(), 1 as *mut Envelope);
        assert_eq!(mb.pop().unwrap().as_raw(), 2 as *mut Envelope);
        assert!(mb.pop().is_none());
    }

    #[test]
    fn delayed_queue_expires_in_deadline_order() {
        let mut q = DelayedQueue::new();
        q.insert(handle(3), 300);
        q.insert(handle(1), 100);
        q.insert(handle(2), 200);
        let mut order = std::vec::Vec::new();
        q.expire(150, |h| order.push(h.as_raw() as usize));
        assert_eq!(order, std::vec![1]);
        order.clear();
        q.expire(300, |h| order.push(h.as_raw() as usize));
        assert_eq!(order, std::vec![2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn delayed_queue_breaks_ties_fifo() {
        let mut q = DelayedQueue::new();
        q.insert(handle(1), 100);
        q.insert(handle(2), 100);
        q.insert(handle(3), 100);
        let mut order = std::vec::Vec::new();
        q.expire(100, |h| order.push(h.as_raw() as usize));
        assert_eq!(order, std::vec![1, 2, 3]);
    }
}
