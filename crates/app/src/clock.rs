//! Main clock switching.

use timebase::TickService;
use tracer_hal::{ClockSource, MainClock, TickTimer};

/// Switch the main clock to `source` and re-base the time base for the
/// new frequency.
///
/// Skipping the re-base leaves every later `wait` off by the ratio of the
/// two clock rates.
pub fn switch_main_clock<C, T>(clock: &mut C, ticks: &TickService<T>, source: ClockSource)
where
    C: MainClock,
    T: TickTimer,
{
    clock.select(source);
    ticks.restart(source.frequency_hz());
    debug!("clock: main clock switched, {} Hz", source.frequency_hz());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracer_hal::mocks::{MockMainClock, MockTickTimer};

    #[test]
    fn switch_restarts_time_base_at_new_rate() {
        let mut clock = MockMainClock::default();
        let ticks = TickService::new(MockTickTimer::new());

        switch_main_clock(&mut clock, &ticks, ClockSource::PllOut);
        assert_eq!(clock.current(), ClockSource::PllOut);
        assert_eq!(ticks.timer().prescale(), 71_999);

        switch_main_clock(&mut clock, &ticks, ClockSource::WdtOsc);
        assert_eq!(ticks.timer().prescale(), 8);
        assert_eq!(ticks.timer().restarts(), 2);
    }

    #[test]
    fn switch_rebases_counter_to_zero() {
        let mut clock = MockMainClock::default();
        let ticks = TickService::new(MockTickTimer::running(0, 11_999));
        ticks.timer().set_counter(12_345);

        switch_main_clock(&mut clock, &ticks, ClockSource::PllIn);
        assert_eq!(ticks.now(), 0);
    }
}
