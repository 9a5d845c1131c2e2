//! Output rounding that keeps every item fully allocated.

use crate::normalize::round_decimals;

/// Rounds every fraction to `digits` decimals in place.
///
/// Raw LP values are first clamped into `[0, 1]`. When rounding leaves an
/// item's column off 1, the residual goes to the agent holding the largest
/// fraction of that item (lowest index on ties). Returns the number of
/// items that needed a repair.
pub(crate) fn round_fractions(fractions: &mut [Vec<f64>], digits: u32) -> usize {
    let num_items = fractions.first().map_or(0, |row| row.len());
    for row in fractions.iter_mut() {
        for x in row.iter_mut() {
            *x = round_decimals(x.clamp(0.0, 1.0), digits);
        }
    }

    let mut repaired = 0usize;
    for o in 0..num_items {
        let sum: f64 = fractions.iter().map(|row| row[o]).sum();
        let residual = 1.0 - sum;
        if residual.abs() <= 1e-9 {
            continue;
        }
        let Some(holder) = largest_holder(fractions, o) else {
            continue;
        };
        let x = &mut fractions[holder][o];
        *x = round_decimals((*x + residual).clamp(0.0, 1.0), digits);
        repaired += 1;
    }
    repaired
}

fn largest_holder(fractions: &[Vec<f64>], item: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (a, row) in fractions.iter().enumerate() {
        if best.is_none_or(|(_, v)| row[item] > v) {
            best = Some((a, row[item]));
        }
    }
    best.map(|(a, _)| a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_values_untouched() {
        let mut f = vec![vec![1.0, 0.25], vec![0.0, 0.75]];
        assert_eq!(round_fractions(&mut f, 3), 0);
        assert_eq!(f, vec![vec![1.0, 0.25], vec![0.0, 0.75]]);
    }

    #[test]
    fn test_residual_goes_to_largest_holder() {
        let mut f = vec![vec![0.3334], vec![0.3333], vec![0.3333]];
        assert_eq!(round_fractions(&mut f, 3), 1);
        assert_eq!(f, vec![vec![0.334], vec![0.333], vec![0.333]]);
    }

    #[test]
    fn test_excess_taken_from_largest_holder() {
        let mut f = vec![vec![0.2], vec![0.4005], vec![0.3995]];
        round_fractions(&mut f, 3);
        let sum: f64 = f.iter().map(|row| row[0]).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(f[0][0], 0.2);
    }

    #[test]
    fn test_negative_zero_and_noise() {
        let mut f = vec![vec![-1e-12, 1.0000000001], vec![1.0, -0.0]];
        round_fractions(&mut f, 3);
        for row in &f {
            for x in row {
                assert!(x.is_sign_positive(), "negative zero leaked: {x:?}");
            }
        }
        assert_eq!(f, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    }
}
