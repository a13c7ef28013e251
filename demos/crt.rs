//! CRT display sink: receives `CRT_DISPLAY`-typed messages and forwards
//! them to the UART output ring a byte at a time (spec §11, grounded in
//! `crt.c`'s `proc_crt`).

use crate::api;

const MTYPE_CRT_DISPLAY: u32 = 3;

pub fn run() -> ! {
    let mut buf = [0u8; 64];
    loop {
        match api::receive_message(&mut buf) {
            Ok((_sender, MTYPE_CRT_DISPLAY, len)) => {
                for b in &buf[..len] {
                    while !crate::uart::tx_has_room() {
                        api::release_processor();
                    }
                    crate::uart::tx_push(*b);
                }
            }
            Ok(_) => {
                // Not a display message; nothing to do but let the
                // memory block `receive_message` already released go.
            }
            Err(_) => {}
        }
    }
}
