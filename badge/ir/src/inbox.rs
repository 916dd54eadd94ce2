//! Interrupt-safe hand-off of received frames

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use heapless::Deque;

use crate::frame::FrameBuf;

/// Default number of received frames buffered between ticks
pub const INBOX_LEN: usize = 4;

/// Bounded queue filled by the receive interrupt and drained by the tick.
///
/// The rest of the runtime is single-threaded; this is the one place where
/// an interrupt handler and the main loop touch the same data, so both
/// sides go through a critical section.
pub struct IrInbox<const N: usize = INBOX_LEN> {
    frames: Mutex<RefCell<Deque<FrameBuf, N>>>,
    overflows: Mutex<Cell<u32>>,
}

impl<const N: usize> IrInbox<N> {
    pub const fn new() -> Self {
        Self {
            frames: Mutex::new(RefCell::new(Deque::new())),
            overflows: Mutex::new(Cell::new(0)),
        }
    }

    /// Copy a received frame in. Returns `false` if it was dropped because
    /// the inbox is full or the frame is too long.
    pub fn push(&self, bytes: &[u8]) -> bool {
        critical_section::with(|cs| {
            let stored = FrameBuf::from_slice(bytes)
                .ok()
                .map(|frame| self.frames.borrow_ref_mut(cs).push_back(frame).is_ok())
                .unwrap_or(false);
            if !stored {
                let overflows = self.overflows.borrow(cs);
                overflows.set(overflows.get().wrapping_add(1));
            }
            stored
        })
    }

    pub fn pop(&self) -> Option<FrameBuf> {
        critical_section::with(|cs| self.frames.borrow_ref_mut(cs).pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.frames.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frames dropped on push
    pub fn overflows(&self) -> u32 {
        critical_section::with(|cs| self.overflows.borrow(cs).get())
    }
}

impl<const N: usize> Default for IrInbox<N> {
    fn default() -> Self {
        Self::new()
    }
}
