//! Message envelope (spec §3, §6).
//!
//! An envelope occupies exactly one memory block — the header plus
//! `mtext` together are sized and aligned to fit inside a
//! [`crate::mem::Block`]. The design notes in spec §9 replace the
//! original's embedded-`next` linked envelope with a plain struct: the
//! ordering that the `next` field used to encode is now owned by
//! whichever ring (mailbox or delayed queue) holds the envelope's handle.

use crate::config::BLOCK_SIZE;
use crate::process::Pid;

/// Bytes available for the user payload: one block, minus the header,
/// minus one byte for a guaranteed NUL terminator (spec §6).
pub const MTEXT_MAXLEN: usize = BLOCK_SIZE - HEADER_SIZE - 1;

/// `mtype` + `deadline` + `len` + `sender_pid` + `receiver_pid`, in that
/// declaration order so `#[repr(C)]` needs no inter-field padding
/// (4 + 4 + 2 + 1 + 1). Declared separately from the struct so
/// `MTEXT_MAXLEN` can be computed before `Envelope` exists.
const HEADER_SIZE: usize = 4 + 4 + 2 + 1 + 1;

/// The recognized fields of a message envelope (spec §3).
///
/// Field order matters here: `u32`s first, then the `u16` length, then
/// the two `Pid` bytes, so the `#[repr(C)]` layout has zero padding and
/// `HEADER_SIZE` above stays exact. `deadline` is the kernel-reserved
/// field used to store the delivery tick for a delayed send (spec
/// §4.4); it is meaningless until the envelope has been through
/// `delayed_send`.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct Envelope {
    pub mtype: u32,
    pub deadline: u32,
    len: u16,
    pub sender_pid: Pid,
    pub receiver_pid: Pid,
    mtext: [u8; MTEXT_MAXLEN],
}

impl Envelope {
    pub const fn empty() -> Self {
        Envelope {
            mtype: 0,
            deadline: 0,
            len: 0,
            sender_pid: 0,
            receiver_pid: 0,
            mtext: [0u8; MTEXT_MAXLEN],
        }
    }

    /// Set the payload, truncating to `MTEXT_MAXLEN` bytes (spec §6).
    pub fn set_mtext(&mut self, data: &[u8]) {
        let n = data.len().min(MTEXT_MAXLEN);
        self.mtext[..n].copy_from_slice(&data[..n]);
        self.len = n as u16;
    }

    pub fn mtext(&self) -> &[u8] {
        &self.mtext[..self.len as usize]
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::empty()
    }
}

const _SIZE_FITS_IN_BLOCK: () = assert!(core::mem::size_of::<Envelope>() <= BLOCK_SIZE);
