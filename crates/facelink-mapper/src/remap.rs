//! Range normalization

/// Map `value` from `[min, max]` onto `[0, 1]`, clamping outside the range.
///
/// A collapsed range (`min == max`) and any NaN input yield 0.
#[inline]
pub fn remap(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span == 0.0 || !span.is_finite() || value.is_nan() {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// `1 - remap(...)`
#[inline]
pub fn remap_inverted(value: f32, min: f32, max: f32) -> f32 {
    1.0 - remap(value, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(remap(0.40, 0.40, 0.70), 0.0);
        assert_eq!(remap(0.70, 0.40, 0.70), 1.0);
        assert_eq!(remap(3.75, 3.0, 4.5), 0.5);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(remap(-10.0, 0.0, 1.0), 0.0);
        assert_eq!(remap(10.0, 0.0, 1.0), 1.0);
        assert_eq!(remap(f32::INFINITY, 0.0, 1.0), 1.0);
        assert_eq!(remap(f32::NEG_INFINITY, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_collapsed_range_is_zero() {
        assert_eq!(remap(0.5, 0.5, 0.5), 0.0);
        assert_eq!(remap(100.0, 0.5, 0.5), 0.0);
        assert_eq!(remap(f32::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_negative_ranges() {
        assert_eq!(remap(-0.125, -0.25, 0.0), 0.5);
        assert_eq!(remap_inverted(-0.25, -0.25, 0.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_monotonic_and_bounded(
            min in -10.0f32..10.0,
            width in 0.001f32..10.0,
            a in -30.0f32..30.0,
            b in -30.0f32..30.0,
        ) {
            let max = min + width;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let r_lo = remap(lo, min, max);
            let r_hi = remap(hi, min, max);
            prop_assert!(r_lo <= r_hi);
            prop_assert!((0.0..=1.0).contains(&r_lo));
            prop_assert!((0.0..=1.0).contains(&r_hi));
        }

        #[test]
        fn prop_endpoints(min in -10.0f32..10.0, width in 0.001f32..10.0) {
            let max = min + width;
            prop_assert_eq!(remap(min, min, max), 0.0);
            prop_assert_eq!(remap(max, min, max), 1.0);
        }

        #[test]
        fn prop_collapsed_range(value in -100.0f32..100.0, point in -10.0f32..10.0) {
            prop_assert_eq!(remap(value, point, point), 0.0);
        }
    }
}
