//! Real ARM Cortex-M backend.
//!
//! A synchronous, naked-asm context switch — no PendSV indirection.
//! `save_current_sp` pushes the outgoing process's callee-saved
//! registers and link register onto its own (PSP) stack and returns the
//! resulting stack pointer; `dispatch_sp` does the reverse on the
//! incoming process's saved stack pointer and `bx lr`s into it. Since
//! `lr` is restored along with the other registers, that branch lands
//! wherever the incoming process itself last called `save_current_sp`
//! — the same symmetric coroutine-style swap as the teacher's own naked
//! `spawn_exec_save_rsp`/`jump_to_userspace` pair in `sys/process.rs`,
//! generalized from a one-shot x86_64 `iretq` into userspace to a
//! resumable ARM switch.
//!
//! `sched::perform` is the only caller, and only once the kernel's own
//! lock has been dropped — see its doc comment for why.

use core::arch::asm;

use cortex_m::interrupt;

use super::ContextSwitch;

pub fn with_irqs_disabled<R>(f: impl FnOnce() -> R) -> R {
    interrupt::free(|_| f())
}

pub struct ArchImpl;

impl ContextSwitch for ArchImpl {
    fn save_current_sp() -> u32 {
        let sp: u32;
        unsafe {
            asm!(
                "mrs {sp}, psp",
                "stmdb {sp}!, {{r4-r11, lr}}",
                sp = out(reg) sp,
            );
        }
        sp
    }

    fn dispatch_sp(sp: u32) -> ! {
        unsafe {
            asm!(
                "ldmia {sp}!, {{r4-r11, lr}}",
                "msr psp, {sp}",
                "bx lr",
                sp = in(reg) sp,
                options(noreturn),
            );
        }
    }
}
