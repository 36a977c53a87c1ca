//! Local-extremum predicates over a margin window.
//!
//! The comparison is asymmetric: strict against the backward margin,
//! non-strict against the forward margin. Across an exact plateau this fires
//! on the first plateau minute only.

/// `current` is strictly greater than every value in `before` and greater
/// than or equal to every value in `after`.
///
/// Empty margins are vacuously satisfied; callers pick the margin width.
pub fn is_local_max(before: &[f64], current: f64, after: &[f64]) -> bool {
    before.iter().all(|&v| current > v) && after.iter().all(|&v| current >= v)
}

/// Mirror of [`is_local_max`]: strictly below the backward margin, at or
/// below the forward margin.
pub fn is_local_min(before: &[f64], current: f64, after: &[f64]) -> bool {
    before.iter().all(|&v| current < v) && after.iter().all(|&v| current <= v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn peak_detected() {
        assert!(is_local_max(&[1.0, 2.0], 3.0, &[2.0, 1.0]));
        assert!(!is_local_min(&[1.0, 2.0], 3.0, &[2.0, 1.0]));
    }

    #[test]
    fn trough_detected() {
        assert!(is_local_min(&[5.0, 4.0], 3.0, &[4.0, 5.0]));
    }

    #[test]
    fn plateau_fires_on_first_minute_only() {
        let series = [1.0, 2.0, 5.0, 5.0, 5.0, 2.0, 1.0];
        let fired: Vec<usize> = (2..series.len() - 2)
            .filter(|&i| is_local_max(&series[i - 2..i], series[i], &series[i + 1..i + 3]))
            .collect();
        assert_eq!(fired, vec![2]);
    }

    #[test]
    fn equal_neighbour_before_blocks() {
        assert!(!is_local_max(&[3.0], 3.0, &[1.0]));
    }

    proptest! {
        #[test]
        fn monotonic_never_fires(start in -1000.0f64..1000.0, step in 1e-6f64..10.0, margin in 1usize..6) {
            let n = 2 * margin + 20;
            let inc: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            let dec: Vec<f64> = inc.iter().rev().copied().collect();
            for seq in [&inc, &dec] {
                for i in margin..n - margin {
                    let before = &seq[i - margin..i];
                    let after = &seq[i + 1..=i + margin];
                    prop_assert!(!is_local_max(before, seq[i], after));
                    prop_assert!(!is_local_min(before, seq[i], after));
                }
            }
        }
    }
}
