//! Architecture abstraction.
//!
//! Two backends: [`cortex_m`] is the real ARM Cortex-M trampoline used
//! by the `boot` binary, [`host`] is a test-only stand-in that lets the
//! scheduler's bookkeeping be exercised with `cargo test` on the
//! developer's own machine, the same split the teacher draws between its
//! real x86_64 `sys::gdt`/interrupt plumbing and nothing it would ever
//! run off-target (here, the pack didn't carry a host backend, so this
//! one is modeled on the teacher's own disable/enable-interrupts idiom
//! in `sys/pic.rs` and `sys/ipc/mod.rs`, generalized to any target).

#[cfg(target_arch = "arm")]
mod cortex_m_backend;
#[cfg(target_arch = "arm")]
pub use cortex_m_backend as backend;

#[cfg(not(target_arch = "arm"))]
mod host;
#[cfg(not(target_arch = "arm"))]
pub use host as backend;

/// The active backend's [`ContextSwitch`] implementation.
pub type Arch = backend::ArchImpl;

/// The two opaque operations a context switch needs. Everything about
/// register layout and the exception return mechanism lives behind
/// this trait; `sched` never sees a register, only the plain `u32`
/// stack-pointer values it stores in a [`crate::process::Pcb`].
///
/// Deliberately free of any reference to `Pcb`/`Kernel`: `dispatch_sp`
/// never returns on the real target, so it must only ever be called
/// once the kernel's own lock has already been dropped (see
/// `sched::perform`) — taking raw `u32`s instead of a borrow makes that
/// the only way to call it.
pub trait ContextSwitch {
    /// Save the currently running process's machine context onto its
    /// own stack and return the resulting stack pointer. Called with
    /// interrupts already disabled.
    fn save_current_sp() -> u32;

    /// Restore the machine context saved at `sp` and resume it. Never
    /// returns.
    fn dispatch_sp(sp: u32) -> !;
}

/// Disable interrupts, run `f`, restore the prior interrupt state.
/// Recursive: nested calls are safe, matching the kernel's own
/// `irq_depth` counter in [`crate::kernel`].
pub fn with_irqs_disabled<R>(f: impl FnOnce() -> R) -> R {
    backend::with_irqs_disabled(f)
}
