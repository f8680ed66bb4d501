use binlens_common::{BinLensError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One (independent, dependent) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Converts an f64 to the decimal it prints as, so `0.1` becomes exactly `0.1`
/// rather than the nearest binary fraction.
///
/// Values whose printed form needs more than 28 fractional digits, or exceeds
/// the decimal range, are [`BinLensError::OutOfRange`] instead of being rounded.
pub fn to_decimal(v: f64) -> Result<Decimal> {
    if !v.is_finite() {
        return Err(BinLensError::OutOfRange(v));
    }
    if v == 0.0 {
        return Ok(Decimal::ZERO);
    }
    let printed = v.to_string();
    let d = Decimal::from_str(&printed).map_err(|_| BinLensError::OutOfRange(v))?;
    // from_str rounds past 28 fractional digits
    if d.normalize().to_string() != printed {
        return Err(BinLensError::OutOfRange(v));
    }
    Ok(d)
}

/// Samples sorted ascending by `x`, each paired with its exact decimal key.
///
/// Built from a private copy; the caller's slice is never reordered. The sort
/// is stable so equal keys keep their input order.
#[derive(Debug, Clone, Default)]
pub struct SortedSamples {
    samples: Vec<Sample>,
    keys: Vec<Decimal>,
}

impl SortedSamples {
    pub fn new(samples: &[Sample]) -> Result<Self> {
        let mut keyed = Vec::with_capacity(samples.len());
        for (index, s) in samples.iter().enumerate() {
            if !s.x.is_finite() {
                return Err(BinLensError::NonFinite { column: "x".into(), index });
            }
            if !s.y.is_finite() {
                return Err(BinLensError::NonFinite { column: "y".into(), index });
            }
            keyed.push((to_decimal(s.x)?, *s));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let (keys, samples): (Vec<Decimal>, Vec<Sample>) = keyed.into_iter().unzip();
        Ok(Self { samples, keys })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Decimal independent values in ascending order.
    pub fn keys(&self) -> &[Decimal] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_copy_without_touching_input() {
        let input = vec![Sample::new(3.0, 30.0), Sample::new(1.0, 10.0), Sample::new(2.0, 20.0)];
        let sorted = SortedSamples::new(&input).unwrap();
        let xs: Vec<f64> = sorted.samples().iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(input[0].x, 3.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![Sample::new(1.0, 1.0), Sample::new(0.0, 9.0), Sample::new(1.0, 2.0)];
        let sorted = SortedSamples::new(&input).unwrap();
        let ys: Vec<f64> = sorted.samples().iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![9.0, 1.0, 2.0]);
    }

    #[test]
    fn decimal_keys_are_exact() {
        assert_eq!(to_decimal(0.1).unwrap(), Decimal::from_str("0.1").unwrap());
        assert_eq!(to_decimal(-2.5).unwrap(), Decimal::from_str("-2.5").unwrap());
    }

    #[test]
    fn rejects_nan_and_infinity() {
        let err = SortedSamples::new(&[Sample::new(1.0, 1.0), Sample::new(f64::NAN, 1.0)]).unwrap_err();
        assert!(matches!(err, BinLensError::NonFinite { index: 1, .. }));
        let err = SortedSamples::new(&[Sample::new(1.0, f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, BinLensError::NonFinite { ref column, index: 0 } if column == "y"));
    }

    #[test]
    fn rejects_values_beyond_decimal_range() {
        let err = SortedSamples::new(&[Sample::new(1e30, 0.0)]).unwrap_err();
        assert!(matches!(err, BinLensError::OutOfRange(_)));
    }

    #[test]
    fn rejects_digits_past_decimal_resolution() {
        assert!(matches!(to_decimal(1e-29), Err(BinLensError::OutOfRange(_))));
        assert!(matches!(to_decimal(3e-29), Err(BinLensError::OutOfRange(_))));
        assert!(matches!(to_decimal(1.5e-28), Err(BinLensError::OutOfRange(_))));
        assert_eq!(to_decimal(1e-28).unwrap(), Decimal::new(1, 28));
        assert_eq!(to_decimal(-0.0).unwrap(), Decimal::ZERO);
        let err = SortedSamples::new(&[Sample::new(1e-29, 1.0), Sample::new(3e-29, 2.0)]).unwrap_err();
        assert!(matches!(err, BinLensError::OutOfRange(_)));
    }

    #[test]
    fn empty_input_is_allowed() {
        let sorted = SortedSamples::new(&[]).unwrap();
        assert!(sorted.is_empty());
        assert!(sorted.keys().is_empty());
    }
}
