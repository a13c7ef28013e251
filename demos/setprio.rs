//! `%C` command handler: parses `%C <pid> <priority>` lines from the
//! command decoder and calls `set_process_priority` (spec §11, grounded
//! in `sys_proc.c`'s fixed-offset `%C` parsing).

use crate::api;
use crate::process::Priority;

const PID_KCD: u8 = 12;
const MTYPE_KCD_REG: u32 = 1;
const MTYPE_KCD_CMD: u32 = 2;

pub fn run() -> ! {
    let _ = api::send_message(PID_KCD, MTYPE_KCD_REG, b"%C");
    let mut buf = [0u8; 64];
    loop {
        if let Ok((_sender, MTYPE_KCD_CMD, len)) = api::receive_message(&mut buf) {
            handle(&buf[..len]);
        }
    }
}

fn handle(text: &[u8]) {
    // "%C " + pid digits + " " + priority digit, e.g. "%C 5 2".
    let rest = match text.get(3..) {
        Some(r) => r,
        None => return,
    };
    let mut it = rest.split(|b| *b == b' ').filter(|s| !s.is_empty());
    let pid = match it.next().and_then(parse_u32) {
        Some(v) => v as u8,
        None => return,
    };
    let prio = match it.next().and_then(parse_u32) {
        Some(v) => v,
        None => return,
    };
    let priority = match prio {
        0 => Priority::Highest,
        1 => Priority::Medium,
        2 => Priority::Low,
        3 => Priority::Lowest,
        _ => return,
    };
    let _ = api::set_process_priority(pid, priority);
}

fn parse_u32(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut v = 0u32;
    for b in bytes {
        v = v * 10 + (*b - b'0') as u32;
    }
    Some(v)
}
