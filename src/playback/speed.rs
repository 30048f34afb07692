//! Playback speed stepping.

/// Smallest change a single speed press makes.
pub const SPEED_STEP: f64 = 0.1;

/// Round to one decimal place.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Next speed after multiplying `current` by `factor`.
///
/// The product is rounded to one decimal. When rounding would swallow the
/// change (0.1 × 1.1 rounds back to 0.1) the speed still moves by
/// [`SPEED_STEP`] in the direction of `factor`. The result is clamped to
/// `[min, max]`.
pub fn next_speed(current: f64, factor: f64, min: f64, max: f64) -> f64 {
    let mut next = round_tenth(current * factor);
    if factor > 1.0 && next <= current {
        next = round_tenth(current + SPEED_STEP);
    } else if factor < 1.0 && next >= current {
        next = round_tenth(current - SPEED_STEP);
    }
    next.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplies_and_rounds() {
        assert_eq!(next_speed(1.0, 1.1, 0.1, 8.0), 1.1);
        assert_eq!(next_speed(1.0, 0.9, 0.1, 8.0), 0.9);
        assert_eq!(next_speed(2.0, 1.1, 0.1, 8.0), 2.2);
    }

    #[test]
    fn small_speeds_still_move() {
        assert_eq!(next_speed(0.1, 1.1, 0.1, 8.0), 0.2);
        assert_eq!(next_speed(0.3, 0.9, 0.1, 8.0), 0.2);
        assert_eq!(next_speed(0.5, 1.1, 0.1, 8.0), 0.6);
    }

    #[test]
    fn clamps_to_bounds() {
        assert_eq!(next_speed(0.1, 0.9, 0.1, 8.0), 0.1);
        assert_eq!(next_speed(7.9, 1.1, 0.1, 8.0), 8.0);
        assert_eq!(next_speed(8.0, 1.1, 0.1, 8.0), 8.0);
    }

    #[test]
    fn neutral_factor_keeps_speed() {
        assert_eq!(next_speed(1.3, 1.0, 0.1, 8.0), 1.3);
    }
}
