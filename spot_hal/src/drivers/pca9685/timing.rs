//! Frequency and pulse-width arithmetic for the 12-bit counter.

/// Counter resolution (12 bit).
pub const STEPS: u32 = 4096;

const PRESCALE_MIN: f64 = 3.0;
const PRESCALE_MAX: f64 = 255.0;

/// Prescaler value for an output frequency, `None` if the chip cannot
/// produce it from the given oscillator.
pub fn prescale(reference_clock_hz: u32, frequency_hz: u32) -> Option<u8> {
    if frequency_hz == 0 {
        return None;
    }
    let value = (f64::from(reference_clock_hz) / (f64::from(STEPS) * f64::from(frequency_hz)))
        .round()
        - 1.0;
    (PRESCALE_MIN..=PRESCALE_MAX)
        .contains(&value)
        .then_some(value as u8)
}

/// OFF count for a pulse width, `None` if the pulse does not fit in one period.
pub fn pulse_ticks(pulse_us: u16, frequency_hz: u32) -> Option<u16> {
    if frequency_hz == 0 || u64::from(pulse_us) * u64::from(frequency_hz) >= 1_000_000 {
        return None;
    }
    let ticks = (f64::from(pulse_us) * f64::from(frequency_hz) * f64::from(STEPS) / 1_000_000.0)
        .round() as u16;
    Some(ticks.min((STEPS - 1) as u16))
}
