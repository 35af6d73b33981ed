//! SW1: debounced, active-low push switch.
//!
//! All operations block the foreground through the time base's `wait`,
//! 50 ms per sample pair. A failed pin read counts as released.
//!
//! To leave a long foreground loop on a press without polling, the GPIO
//! edge interrupt calls [`timebase::TickService::cancel`] and the loop
//! waits with [`timebase::WAIT_FOREVER`].

use embedded_hal::digital::InputPin;
use timebase::TickService;
use tracer_hal::TickTimer;

/// Settling time between the two reads of a scan, in milliseconds.
pub const DEBOUNCE_MS: u32 = 50;

/// Hold time that turns a click into a hold, in milliseconds.
pub const CLICK_HOLD_MS: u32 = 1000;

/// Result of a switch query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchState {
    /// Released.
    Off,
    /// Pressed (scan), or clicked and released (click).
    On,
    /// Pressed for longer than the hold time, then released.
    Hold,
}

/// Active-low push switch on `P`.
pub struct Switch<P> {
    pin: P,
}

impl<P: InputPin> Switch<P> {
    /// Wrap the switch input. The pull-up is on the board.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Debounced level: read, settle, read again until two reads agree.
    pub fn scan<T: TickTimer>(&mut self, ticks: &TickService<T>) -> SwitchState {
        loop {
            let first = self.pressed();
            ticks.wait(DEBOUNCE_MS);
            if first == self.pressed() {
                return if first {
                    SwitchState::On
                } else {
                    SwitchState::Off
                };
            }
        }
    }

    /// `On` if the switch was pressed, after waiting for its release;
    /// `Off` straight away otherwise.
    pub fn click<T: TickTimer>(&mut self, ticks: &TickService<T>) -> SwitchState {
        if self.scan(ticks) == SwitchState::Off {
            return SwitchState::Off;
        }
        while self.scan(ticks) == SwitchState::On {}
        SwitchState::On
    }

    /// Block until a full press and release.
    pub fn standby<T: TickTimer>(&mut self, ticks: &TickService<T>) {
        while self.click(ticks) == SwitchState::Off {
            core::hint::spin_loop();
        }
    }

    /// Like [`Self::click`], but a press held longer than `hold_ms`
    /// reports [`SwitchState::Hold`].
    pub fn click_hold<T: TickTimer>(&mut self, ticks: &TickService<T>, hold_ms: u32) -> SwitchState {
        if self.scan(ticks) == SwitchState::Off {
            return SwitchState::Off;
        }
        let start = ticks.now();
        while self.scan(ticks) == SwitchState::On {}
        let held = ticks.elapsed_since(start);
        trace!("switch: released after {} ms", held);

        if held > hold_ms {
            SwitchState::Hold
        } else {
            SwitchState::On
        }
    }

    /// Release the pin.
    pub fn free(self) -> P {
        self.pin
    }

    fn pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}
