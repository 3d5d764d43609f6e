//! Mixed-radix enumeration of unit assignments.
//!
//! A candidate assignment of `width` objects over `base` values is the
//! fixed-width base-`base` numeral of its combination index. Digit 0 is the
//! least significant one, so the first object varies fastest.

use relocator_core::{RelocationError, Result};

/// Fixed-width numeral system with a uniform base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixedRadix {
    base: u32,
    width: usize,
}

impl MixedRadix {
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidArgument`] if `base < 2` or `width == 0`.
    pub fn new(base: u32, width: usize) -> Result<Self> {
        if base < 2 {
            return Err(RelocationError::invalid(format!(
                "combination base must be at least 2, got {base}"
            )));
        }
        if width == 0 {
            return Err(RelocationError::invalid("no objects to combine"));
        }
        Ok(Self { base, width })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of combinations, `base^width`, saturating at `u128::MAX`.
    pub fn combinations(&self) -> u128 {
        let base = u128::from(self.base);
        u32::try_from(self.width)
            .ok()
            .and_then(|width| base.checked_pow(width))
            .unwrap_or(u128::MAX)
    }

    /// Decodes a combination index into `digits` (least significant first).
    pub fn decode(&self, index: u128, digits: &mut [u32]) {
        let base = u128::from(self.base);
        let mut rest = index;
        for digit in digits.iter_mut().take(self.width) {
            *digit = (rest % base) as u32;
            rest /= base;
        }
    }

    /// Iterates every combination in increasing index order.
    pub fn odometer(&self) -> Odometer {
        Odometer {
            radix: *self,
            digits: vec![0; self.width],
            next_index: 0,
            total: self.combinations(),
        }
    }
}

/// Incremental counterpart of [`MixedRadix::decode`].
///
/// Produces the same digits as decoding each index in turn, without the
/// divisions.
#[derive(Debug, Clone)]
pub struct Odometer {
    radix: MixedRadix,
    digits: Vec<u32>,
    next_index: u128,
    total: u128,
}

impl Odometer {
    /// Advances to the next combination.
    ///
    /// Returns the combination index and its digits, or `None` once the
    /// space is exhausted.
    pub fn advance(&mut self) -> Option<(u128, &[u32])> {
        if self.next_index >= self.total {
            return None;
        }
        let index = self.next_index;
        if index > 0 {
            for digit in self.digits.iter_mut() {
                *digit += 1;
                if *digit < self.radix.base {
                    break;
                }
                *digit = 0;
            }
        }
        self.next_index += 1;
        Some((index, &self.digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations() {
        assert_eq!(MixedRadix::new(4, 2).unwrap().combinations(), 16);
        assert_eq!(MixedRadix::new(3, 1).unwrap().combinations(), 3);
        assert_eq!(MixedRadix::new(51, 40).unwrap().combinations(), u128::MAX);
    }

    #[test]
    fn test_decode_base_four() {
        let radix = MixedRadix::new(4, 2).unwrap();
        let mut digits = [9u32; 2];

        radix.decode(0, &mut digits);
        assert_eq!(digits, [0, 0]);
        radix.decode(1, &mut digits);
        assert_eq!(digits, [1, 0]);
        radix.decode(4, &mut digits);
        assert_eq!(digits, [0, 1]);
        radix.decode(15, &mut digits);
        assert_eq!(digits, [3, 3]);
    }

    #[test]
    fn test_odometer_matches_decode() {
        let radix = MixedRadix::new(3, 3).unwrap();
        let mut odometer = radix.odometer();
        let mut expected = [0u32; 3];
        let mut seen = 0u128;

        while let Some((index, digits)) = odometer.advance() {
            assert_eq!(index, seen);
            radix.decode(index, &mut expected);
            assert_eq!(digits, &expected);
            seen += 1;
        }
        assert_eq!(seen, 27);
    }

    #[test]
    fn test_invalid_radix() {
        assert_eq!(MixedRadix::new(1, 3).unwrap_err().status_code(), 400);
        assert!(MixedRadix::new(2, 0).is_err());
    }
}
