/// Percent value as it arrives from the progress endpoint, before any
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPercent {
    Number(f64),
    Text(String),
    Missing,
}

/// Normalize a reported percent into `0..=100`.
///
/// Strings are trimmed and may carry a trailing `%`. Anything that does not
/// parse as a number, or parses as NaN, is treated as 0; infinities clamp to
/// the nearest bound. Fractions are floored so a reading of 99.9 never counts
/// as completion.
pub fn normalize_percent(raw: &RawPercent) -> u8 {
    let value = match raw {
        RawPercent::Number(n) => *n,
        RawPercent::Text(text) => {
            let trimmed = text.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            trimmed.parse::<f64>().unwrap_or(0.0)
        }
        RawPercent::Missing => 0.0,
    };
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).floor() as u8
}

/// One animation step: advance `display` to the next multiple of ten, capped
/// at `target`. Never moves backwards and never passes `target`.
pub fn step_toward(display: u8, target: u8) -> u8 {
    if display >= target {
        return display;
    }
    let next_ten = (u16::from(display) / 10 + 1) * 10;
    next_ten.min(u16::from(target)) as u8
}
