//! Decimal rounding with ties resolved toward zero.
//!
//! `f64` cannot hold most half-cent values exactly (`1.005` is stored as
//! `1.00499999999999989...`), so multiplying by a power of ten and rounding
//! decides ties by representation error. Instead the rounding here works on
//! the shortest decimal string that round-trips to the same `f64`, which is
//! what a reader sees when the value is printed.

/// Rounds `value` to `scale` decimal places, resolving exact ties toward the
/// smaller magnitude.
///
/// Non-finite values are returned unchanged.
///
/// # Example
///
/// ```
/// use basicstats::rounding::round_half_down;
///
/// assert_eq!(round_half_down(1.005, 2), 1.0);
/// assert_eq!(round_half_down(0.125, 2), 0.12);
/// assert_eq!(round_half_down(0.1251, 2), 0.13);
/// assert_eq!(round_half_down(-0.125, 2), -0.12);
/// ```
pub fn round_half_down(value: f64, scale: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // Display never uses exponent notation for f64.
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let scale = scale as usize;
    if frac_part.len() <= scale {
        return value;
    }

    let (kept, dropped) = frac_part.split_at(scale);
    let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();

    if exceeds_half(dropped) {
        increment(&mut digits);
    }

    let int_len = digits.len() - scale;
    let (int_digits, frac_digits) = digits.split_at(int_len);
    let mut rounded = String::from_utf8_lossy(int_digits).into_owned();
    if !frac_digits.is_empty() {
        rounded.push('.');
        rounded.push_str(&String::from_utf8_lossy(frac_digits));
    }

    let magnitude: f64 = rounded.parse().unwrap_or(value.abs());
    if magnitude == 0.0 {
        // No negative zero in output.
        return 0.0;
    }
    magnitude.copysign(value)
}

/// Whether the dropped digits are strictly greater than one half of the last kept unit.
fn exceeds_half(dropped: &str) -> bool {
    let mut bytes = dropped.bytes();
    match bytes.next() {
        Some(first) if first > b'5' => true,
        Some(b'5') => bytes.any(|b| b != b'0'),
        _ => false,
    }
}

/// Adds one to the last digit, carrying leftward.
fn increment(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_round_down() {
        assert_eq!(round_half_down(1.005, 2), 1.0);
        assert_eq!(round_half_down(0.125, 2), 0.12);
        assert_eq!(round_half_down(2.675, 2), 2.67);
        assert_eq!(round_half_down(0.5, 0), 0.0);
        assert_eq!(round_half_down(2.5, 0), 2.0);
    }

    #[test]
    fn test_above_tie_rounds_up() {
        assert_eq!(round_half_down(1.006, 2), 1.01);
        assert_eq!(round_half_down(1.0051, 2), 1.01);
        assert_eq!(round_half_down(0.129, 2), 0.13);
    }

    #[test]
    fn test_below_tie_rounds_down() {
        assert_eq!(round_half_down(1.004, 2), 1.0);
        assert_eq!(round_half_down(3.14159, 2), 3.14);
    }

    #[test]
    fn test_negative_ties_toward_zero() {
        assert_eq!(round_half_down(-1.005, 2), -1.0);
        assert_eq!(round_half_down(-0.125, 2), -0.12);
        assert_eq!(round_half_down(-0.126, 2), -0.13);
    }

    #[test]
    fn test_carry_propagates() {
        assert_eq!(round_half_down(9.996, 2), 10.0);
        assert_eq!(round_half_down(99.999, 2), 100.0);
        assert_eq!(round_half_down(0.996, 2), 1.0);
    }

    #[test]
    fn test_short_values_unchanged() {
        assert_eq!(round_half_down(5.0, 2), 5.0);
        assert_eq!(round_half_down(2.5, 2), 2.5);
        assert_eq!(round_half_down(-7.25, 2), -7.25);
        assert_eq!(round_half_down(1e20, 2), 1e20);
    }

    #[test]
    fn test_tiny_values() {
        assert_eq!(round_half_down(0.000001, 2), 0.0);
        assert_eq!(round_half_down(0.005, 2), 0.0);
        assert_eq!(round_half_down(0.0051, 2), 0.01);
    }

    #[test]
    fn test_negative_rounds_to_plain_zero() {
        let rounded = round_half_down(-0.004, 2);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_half_down(f64::NAN, 2).is_nan());
        assert_eq!(round_half_down(f64::INFINITY, 2), f64::INFINITY);
    }
}
