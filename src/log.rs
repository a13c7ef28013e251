//! Kernel log sink and `klog!`/`kwarn!`/`kerror!` macros.
//!
//! Grounded in the teacher crate's own macros of the same name: a single
//! lazily-installed global writer behind a spin lock, rather than pulling
//! in `log` or `defmt`. Before [`init`] is called the macros are no-ops,
//! which matters because early boot code runs before any UART is live.

use core::fmt::Write;
use spin::Mutex;

static SINK: Mutex<Option<&'static mut (dyn Write + Send)>> = Mutex::new(None);

/// Install the writer that `klog!`/`kwarn!`/`kerror!` write through.
/// Called once during boot, after the UART is initialized.
pub fn init(sink: &'static mut (dyn Write + Send)) {
    *SINK.lock() = Some(sink);
}

#[doc(hidden)]
pub fn _write_fmt(args: core::fmt::Arguments) {
    if let Some(sink) = SINK.lock().as_mut() {
        let _ = sink.write_fmt(args);
    }
}

#[macro_export]
macro_rules! klog {
    ($($arg:tt)*) => {
        $crate::log::_write_fmt(format_args!(concat!("[LOG] ", $($arg)*, "\n")))
    };
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::log::_write_fmt(format_args!(concat!("[WARN] ", $($arg)*, "\n")))
    };
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::log::_write_fmt(format_args!(concat!("[ERROR] ", $($arg)*, "\n")))
    };
}
