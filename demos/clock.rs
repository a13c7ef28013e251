//! Wall-clock process: answers `%WT`/`%WR`/`%WS` commands and
//! self-reschedules via `delayed_send` every second (spec §11, grounded
//! in `usr_clock.c`).
//!
//! A generation counter is stamped on every self-tick envelope and
//! checked on receipt, so a stale tick left in flight after a `%WS`
//! reset doesn't clobber the new time — `usr_clock.c`'s own guard
//! against exactly this race. `%WT` doesn't print anything itself: in
//! `usr_clock.c` it only bumps `clock_tick`, the same generation counter
//! used to discard in-flight stale ticks, so it reads as a silent halt
//! rather than an on-demand display.

use crate::api;

const PID_CLOCK: u8 = 11;
const PID_KCD: u8 = 12;
const PID_CRT: u8 = 13;
const MTYPE_KCD_REG: u32 = 1;
const MTYPE_KCD_CMD: u32 = 2;
const MTYPE_CRT_DISPLAY: u32 = 3;
/// Internal self-rescheduling tick, not one of the reserved message
/// types in spec §6 — never leaves this process.
const MTYPE_TICK: u32 = 100;

struct Clock {
    hh: u32,
    mm: u32,
    ss: u32,
    generation: u32,
}

impl Clock {
    fn tick(&mut self) {
        self.ss += 1;
        if self.ss == 60 {
            self.ss = 0;
            self.mm += 1;
        }
        if self.mm == 60 {
            self.mm = 0;
            self.hh += 1;
        }
        if self.hh == 24 {
            self.hh = 0;
        }
    }

    fn set(&mut self, hh: u32, mm: u32, ss: u32) {
        self.hh = hh;
        self.mm = mm;
        self.ss = ss;
        self.generation = self.generation.wrapping_add(1);
    }

    fn format(&self, out: &mut [u8; 8]) {
        let digits = [
            self.hh / 10,
            self.hh % 10,
            10,
            self.mm / 10,
            self.mm % 10,
            10,
            self.ss / 10,
            self.ss % 10,
        ];
        for (slot, d) in out.iter_mut().zip(digits.iter()) {
            *slot = if *d == 10 { b':' } else { b'0' + *d as u8 };
        }
    }
}

fn schedule_next_tick(generation: u32) {
    let payload = generation.to_le_bytes();
    let _ = api::delayed_send(PID_CLOCK, MTYPE_TICK, &payload, 1000);
}

fn display(clock: &Clock) {
    let mut formatted = [0u8; 8];
    clock.format(&mut formatted);
    let _ = api::send_message(PID_CRT, MTYPE_CRT_DISPLAY, &formatted);
}

pub fn run() -> ! {
    let _ = api::send_message(PID_KCD, MTYPE_KCD_REG, b"%W");
    let mut clock = Clock {
        hh: 0,
        mm: 0,
        ss: 0,
        generation: 0,
    };
    schedule_next_tick(clock.generation);
    let mut buf = [0u8; 64];
    loop {
        if let Ok((_sender, mtype, len)) = api::receive_message(&mut buf) {
            match mtype {
                MTYPE_TICK if len == 4 => {
                    let generation = u32::from_le_bytes(buf[..4].try_into().unwrap());
                    if generation == clock.generation {
                        clock.tick();
                        schedule_next_tick(clock.generation);
                        display(&clock);
                    }
                }
                MTYPE_KCD_CMD => handle_command(&mut clock, &buf[..len]),
                _ => {}
            }
        }
    }
}

fn handle_command(clock: &mut Clock, text: &[u8]) {
    match text.get(1) {
        Some(b'T') => {
            // Halt: bump the generation so the in-flight self-tick for
            // the old generation gets discarded when it arrives.
            clock.generation = clock.generation.wrapping_add(1);
        }
        Some(b'R') => {
            clock.set(0, 0, 0);
            schedule_next_tick(clock.generation);
            display(clock);
        }
        Some(b'S') if text.len() >= 11 => {
            let hh = parse_two_digits(&text[3..5]);
            let mm = parse_two_digits(&text[6..8]);
            let ss = parse_two_digits(&text[9..11]);
            clock.set(hh, mm, ss);
            schedule_next_tick(clock.generation);
            display(clock);
        }
        _ => {}
    }
}

fn parse_two_digits(bytes: &[u8]) -> u32 {
    let mut v = 0u32;
    for b in bytes {
        if b.is_ascii_digit() {
            v = v * 10 + (*b - b'0') as u32;
        }
    }
    v
}
