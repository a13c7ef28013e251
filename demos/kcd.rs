//! Keyboard command decoder: collects command-prefix registrations from
//! other processes and fans typed lines out to every registrant whose
//! prefix matches, deduplicated with a per-line sent-to bitmask — ported
//! from `kcd.c`'s `entries` list and `sent_to_mask` (spec §11).

use crate::api;
use crate::config::MAX_PROCESSES;

const MTYPE_REG: u32 = 1;
const MTYPE_CMD: u32 = 2;

const MAX_PREFIX: usize = 15;
const MAX_ENTRIES: usize = MAX_PROCESSES;

struct Entry {
    pid: u8,
    prefix: [u8; MAX_PREFIX],
    prefix_len: usize,
}

struct Registry {
    entries: [Option<Entry>; MAX_ENTRIES],
    len: usize,
}

impl Registry {
    fn register(&mut self, pid: u8, prefix: &[u8]) {
        if self.len >= MAX_ENTRIES {
            return;
        }
        let mut buf = [0u8; MAX_PREFIX];
        let n = prefix.len().min(MAX_PREFIX);
        buf[..n].copy_from_slice(&prefix[..n]);
        self.entries[self.len] = Some(Entry {
            pid,
            prefix: buf,
            prefix_len: n,
        });
        self.len += 1;
    }

    fn dispatch(&self, line: &[u8]) {
        let mut sent_to_mask: u32 = 0;
        for entry in self.entries[..self.len].iter().flatten() {
            let p = &entry.prefix[..entry.prefix_len];
            if line.len() >= p.len() && &line[..p.len()] == p {
                let pid_mask = 1u32 << entry.pid;
                if sent_to_mask & pid_mask != 0 {
                    continue;
                }
                sent_to_mask |= pid_mask;
                let _ = api::send_message(entry.pid, MTYPE_CMD, line);
            }
        }
    }
}

pub fn run() -> ! {
    const NONE_ENTRY: Option<Entry> = None;
    let mut registry = Registry {
        entries: [NONE_ENTRY; MAX_ENTRIES],
        len: 0,
    };
    let mut buf = [0u8; 64];
    loop {
        if let Ok((sender, mtype, len)) = api::receive_message(&mut buf) {
            match mtype {
                MTYPE_REG => registry.register(sender, &buf[..len]),
                MTYPE_CMD => registry.dispatch(&buf[..len]),
                _ => {}
            }
        }
    }
}
