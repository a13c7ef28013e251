#![no_std]
#![no_main]

use core::panic::PanicInfo;
use cortex_m_rt::entry;

use rtkernel::kernel::with_kernel;
use rtkernel::process::Priority;
use rtkernel::{demos, kerror, kernel, sched};

/// Reserved PIDs (spec §6).
const PID_SET_PRIO: u8 = 10;
const PID_CLOCK: u8 = 11;
const PID_KCD: u8 = 12;
const PID_CRT: u8 = 13;

#[entry]
fn main() -> ! {
    kernel::init();
    boot_sequence();
    loop {
        cortex_m::asm::wfi();
    }
}

/// Create every process in the fixed boot-time process set (spec §1:
/// there is no loader, the process set is fixed at build time) and
/// dispatch the first one. Each entry point is one of the library
/// modules under [`demos`], cast to its start address the same way the
/// original's linker-placed process table records each process's entry
/// point.
fn boot_sequence() {
    let switch = with_kernel(|k| {
        sched::create_process(
            k,
            PID_SET_PRIO,
            Priority::Medium,
            demos::setprio::run as usize as u32,
        );
        sched::create_process(
            k,
            PID_CLOCK,
            Priority::Lowest,
            demos::clock::run as usize as u32,
        );
        sched::create_process(k, PID_KCD, Priority::Medium, demos::kcd::run as usize as u32);
        sched::create_process(k, PID_CRT, Priority::Medium, demos::crt::run as usize as u32);
        sched::start(k)
    });
    sched::perform(switch);
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(loc) = info.location() {
        kerror!("PANIC at {}:{}:{}", loc.file(), loc.line(), loc.column());
    } else {
        kerror!("PANIC: {}", info);
    }
    loop {
        cortex_m::asm::bkpt();
    }
}
