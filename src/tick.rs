//! Timing seams: the periodic trigger, its registration slot, and the wall clock.
//!
//! An interrupt handler cannot be a method, so each timer resource gets one
//! [`TickSlot`] (a `static`) that its handler calls [`TickSlot::fire`] on.
//! [`Led4::begin`](crate::Led4::begin) registers the display in the slot and
//! [`Led4::end`](crate::Led4::end) takes it out again. Only one live display is
//! supported per timer resource.

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embassy_time::{Duration, Instant};

use crate::{Error, Result};

/// A hardware timer that can run the multiplex cycle at a fixed rate.
pub trait TickSource {
    /// Arms the timer so its slot fires every `period`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimerInitFailed`] if the timer cannot be configured.
    fn start(&mut self, period: Duration) -> Result<()>;

    /// Disarms the timer. No further ticks fire once this returns.
    fn stop(&mut self);
}

/// A monotonic millisecond source, read from application context only.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Something a [`TickSlot`] can drive from interrupt context.
pub trait Multiplex: Sync {
    /// One scan step. Must not block or fail.
    fn multiplex(&self);
}

/// Registration slot routing one timer's interrupt to one display.
///
/// ```
/// use led4_mux::TickSlot;
///
/// static TIMER0_SLOT: TickSlot = TickSlot::new();
///
/// // In the timer interrupt handler:
/// fn on_timer0() {
///     TIMER0_SLOT.fire();
/// }
/// # on_timer0();
/// ```
pub struct TickSlot(CriticalSectionMutex<Cell<Option<&'static dyn Multiplex>>>);

impl TickSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self(CriticalSectionMutex::new(Cell::new(None)))
    }

    /// Runs one multiplex step on the registered display, if any.
    #[inline]
    pub fn fire(&self) {
        if let Some(target) = self.0.lock(Cell::get) {
            target.multiplex();
        }
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.0.lock(Cell::get).is_some()
    }

    /// Claims the slot for `target`. Registering the same target again is a no-op.
    pub(crate) fn register(&self, target: &'static dyn Multiplex) -> Result<()> {
        self.0.lock(|slot| match slot.get() {
            Some(current) if !core::ptr::addr_eq(current, target) => Err(Error::TimerInitFailed),
            _ => {
                slot.set(Some(target));
                Ok(())
            }
        })
    }

    /// Releases the slot if `target` holds it.
    pub(crate) fn unregister(&self, target: &dyn Multiplex) {
        self.0.lock(|slot| {
            if slot
                .get()
                .is_some_and(|current| core::ptr::addr_eq(current, target))
            {
                slot.set(None);
            }
        });
    }
}

impl Default for TickSlot {
    fn default() -> Self {
        Self::new()
    }
}
