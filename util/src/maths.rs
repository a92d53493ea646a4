//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolation over a monotonically increasing breakpoint
/// table.
///
/// `bp` and `v` must have the same length. Inputs outside the breakpoint
/// range are clamped to the nearest end value, so the lookup is total.
///
/// # Panics
/// - If `bp` and `v` have different lengths or are empty. Table shapes are
///   fixed at parameter-load time so this cannot fire at cycle time.
pub fn lin_interp<T>(value: T, bp: &[T], v: &[T]) -> T
where
    T: Float,
{
    assert_eq!(bp.len(), v.len());
    assert!(!bp.is_empty());

    if value <= bp[0] {
        return v[0];
    }
    if value >= bp[bp.len() - 1] {
        return v[v.len() - 1];
    }

    // Find the segment containing value and interpolate within it
    for i in 0..(bp.len() - 1) {
        if value <= bp[i + 1] {
            return lin_map((bp[i], bp[i + 1]), (v[i], v[i + 1]), value);
        }
    }

    v[v.len() - 1]
}

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_interp() {
        let bp = [0.0f64, 1.0, 2.0];
        let v = [0.0f64, 10.0, 40.0];

        // On breakpoints
        assert_eq!(lin_interp(0.0, &bp, &v), 0.0);
        assert_eq!(lin_interp(1.0, &bp, &v), 10.0);
        assert_eq!(lin_interp(2.0, &bp, &v), 40.0);

        // Within segments
        assert_eq!(lin_interp(0.5, &bp, &v), 5.0);
        assert_eq!(lin_interp(1.5, &bp, &v), 25.0);

        // Out of range clamps to the nearest end
        assert_eq!(lin_interp(-10.0, &bp, &v), 0.0);
        assert_eq!(lin_interp(10.0, &bp, &v), 40.0);
    }

    #[test]
    fn test_lin_interp_single_point() {
        assert_eq!(lin_interp(3.0f64, &[1.0], &[7.0]), 7.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5f64, &0.0, &1.0), 0.5);
        assert_eq!(clamp(&-0.5f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&1.5f64, &0.0, &1.0), 1.0);
    }
}
