//! Human-readable renderings of quantities and durations.

use crate::types::Quantity;
use num_traits::{ToPrimitive, Zero};

const SUFFIXES: [&str; 12] = ["", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc"];

/// `999`, `1.23K`, `45.7M`, `789B`, ... and `1.23e+36` past decillions.
/// The last shown digit is rounded half-up; precision is picked from the
/// unrounded value, so `9_999` shows as `10.00K`.
pub fn format_quantity(value: &Quantity) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let exponent = digits.len() - 1;
    let magnitude = exponent / 3;
    if magnitude >= SUFFIXES.len() {
        let mantissa = rounded_prefix(&digits, 3);
        return if mantissa.len() > 3 {
            format!("1.00e+{}", exponent + 1)
        } else {
            format!("{}.{}e+{exponent}", &mantissa[..1], &mantissa[1..])
        };
    }

    // Integer digits plus decimals is always three significant digits.
    let int_len = digits.len() - magnitude * 3;
    let decimals = 3 - int_len;
    let shown = rounded_prefix(&digits, 3);
    let split = shown.len() - decimals;
    if decimals == 0 {
        format!("{shown}{}", SUFFIXES[magnitude])
    } else {
        format!("{}.{}{}", &shown[..split], &shown[split..], SUFFIXES[magnitude])
    }
}

/// The first `n` digits, rounded half-up on digit `n + 1`.
/// A carry lengthens the result (`"999|5"` gives `"1000"`).
fn rounded_prefix(digits: &str, n: usize) -> String {
    let head: u32 = digits[..n].bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));
    let round_up = digits.as_bytes().get(n).is_some_and(|&b| b >= b'5');
    (head + u32::from(round_up)).to_string()
}

/// `45s`, `3m 5s`, `2h 10m`, `1d 4h`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m {}s", seconds % 60);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h {}m", minutes % 60);
    }
    format!("{}d {}h", hours / 24, hours % 24)
}

/// Progress toward `target` as a whole percentage, capped at 100.
pub fn percentage(current: &Quantity, target: &Quantity) -> u8 {
    if target.is_zero() {
        return 0;
    }
    let pct = current * 100u32 / target;
    pct.to_u8().map_or(100, |p| p.min(100))
}
