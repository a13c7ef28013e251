//! UART ring buffers (spec §4.7).
//!
//! Two fixed-capacity byte rings sit between the ISRs in [`crate::isr`]
//! and whatever userspace-facing collaborator drains them — the same
//! split the teacher draws between its interrupt handlers and
//! `api::io`'s blocking reads, just backed by [`crate::ring::Ring`]
//! instead of a heap-allocated queue.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::config::{UART_INPUT_RING, UART_OUTPUT_RING};
use crate::ring::Ring;

static RX: Mutex<Ring<u8, UART_INPUT_RING>> = Mutex::new(Ring::new());
static TX: Mutex<Ring<u8, UART_OUTPUT_RING>> = Mutex::new(Ring::new());

/// Whether the transmit-empty interrupt is currently armed, grounded in
/// `uart_irq.c`'s `uart_iproc_notif_out`/`IER_THRE` pair: the interrupt
/// (here, the willingness to keep pumping the ring) is disabled once the
/// output ring drains and re-armed the next time a byte is pushed onto
/// an empty ring, rather than left enabled to fire uselessly while
/// there's nothing queued.
static TX_IRQ_ENABLED: AtomicBool = AtomicBool::new(true);

/// Called from [`crate::isr::on_uart_rx`]: buffer one received byte,
/// dropping it silently if the input ring is already full rather than
/// blocking an interrupt handler.
pub fn rx_push(byte: u8) {
    let mut rx = RX.lock();
    if !rx.is_full() {
        rx.push_back(byte);
    }
}

/// Drain one received byte, if any is buffered.
pub fn rx_pop() -> Option<u8> {
    let mut rx = RX.lock();
    if rx.is_empty() {
        None
    } else {
        Some(rx.pop_front())
    }
}

/// Queue a byte for transmission, dropping it if the output ring is
/// full — callers that need delivery guarantees should check
/// [`tx_has_room`] first.
pub fn tx_push(byte: u8) {
    let mut tx = TX.lock();
    let was_empty = tx.is_empty();
    if !tx.is_full() {
        tx.push_back(byte);
    }
    if was_empty {
        TX_IRQ_ENABLED.store(true, Ordering::SeqCst);
    }
}

pub fn tx_has_room() -> bool {
    !TX.lock().is_full()
}

/// Called from [`crate::isr::on_uart_tx_empty`]: pop and return the next
/// byte to write to the data register, if the output ring has one.
pub fn tx_pump() -> Option<u8> {
    let mut tx = TX.lock();
    if tx.is_empty() {
        None
    } else {
        Some(tx.pop_front())
    }
}

/// Disable the transmit-empty interrupt (spec §4.7): called once the
/// output ring has just drained, so the handler stops firing until
/// [`tx_push`] re-arms it.
pub fn disable_tx_irq() {
    TX_IRQ_ENABLED.store(false, Ordering::SeqCst);
}

pub fn tx_irq_enabled() -> bool {
    TX_IRQ_ENABLED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_push_and_pop_is_fifo() {
        rx_push(b'a');
        rx_push(b'b');
        assert_eq!(rx_pop(), Some(b'a'));
        assert_eq!(rx_pop(), Some(b'b'));
    }

    #[test]
    fn tx_pump_drains_what_was_pushed() {
        tx_push(1);
        tx_push(2);
        assert_eq!(tx_pump(), Some(1));
        assert_eq!(tx_pump(), Some(2));
        assert_eq!(tx_pump(), None);
    }
}
