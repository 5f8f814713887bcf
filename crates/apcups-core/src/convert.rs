//! Unit conversions applied by the sensor catalog.

/// Round to one decimal place, always yielding a float so whole
/// numbers still display a decimal (100 -> 100.0).
pub fn to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Runtime timeticks to minutes. Timeticks are hundredths of a second.
// TODO: confirm the tick scale against the PowerNet MIB; some units
// report implausibly large runtimes with this divisor.
pub fn runtime_timeticks_to_minutes(ticks: f64) -> f64 {
    let seconds = ticks / 100.0;
    to_one_decimal(seconds / 60.0)
}

/// Timeticks to seconds. Timeticks are hundredths of a second.
pub fn timeticks_to_seconds(ticks: f64) -> f64 {
    to_one_decimal(ticks / 100.0)
}
