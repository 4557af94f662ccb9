//! Slice specifications and their resolution against a sequence length.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::Error;

/// A `start:stop:step` slice over a sequence.
///
/// Omitted bounds default the way they do for native slices: from the
/// beginning to the end for a positive step, from the end to the beginning
/// for a negative one. Negative bounds count from the end.
///
/// ```rust
/// use remotemap_core::Slice;
///
/// let s = Slice::new(1, 4).with_step(2);
/// assert_eq!(s.indices(5).unwrap().iter().collect::<Vec<_>>(), vec![1, 3]);
///
/// let tail = Slice::from(2..);
/// assert_eq!(tail.indices(5).unwrap().iter().collect::<Vec<_>>(), vec![2, 3, 4]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

/// A slice resolved against a concrete length.
///
/// `start` and `stop` are clamped so that iterating `start, start + step,
/// ...` while short of `stop` visits only valid indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceIndices {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl Slice {
    /// `start..stop` with step 1.
    pub fn new(start: i64, stop: i64) -> Self {
        Slice {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// The whole sequence.
    pub fn full() -> Self {
        Slice::default()
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_stop(mut self, stop: i64) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve against a sequence of `len` elements.
    ///
    /// Fails with [`Error::InvalidSlice`] for a zero step.
    pub fn indices(&self, len: usize) -> Result<SliceIndices, Error> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(Error::InvalidSlice {
                message: "slice step cannot be zero".to_string(),
            });
        }

        let len = len as i64;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let clamp = |bound: i64| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = match self.start {
            Some(start) => clamp(start),
            None if step < 0 => upper,
            None => lower,
        };
        let stop = match self.stop {
            Some(stop) => clamp(stop),
            None if step < 0 => lower,
            None => upper,
        };

        Ok(SliceIndices { start, stop, step })
    }
}

impl SliceIndices {
    /// Number of indices the slice covers.
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            self.stop - self.start
        } else {
            self.start - self.stop
        };
        if span <= 0 {
            0
        } else {
            ((span as u64 - 1) / self.step.unsigned_abs() + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered indices, in slice order.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let SliceIndices { start, step, .. } = *self;
        (0..self.len() as i64).map(move |n| start + n * step)
    }
}

impl From<Range<i64>> for Slice {
    fn from(r: Range<i64>) -> Self {
        Slice::new(r.start, r.end)
    }
}

impl From<RangeFrom<i64>> for Slice {
    fn from(r: RangeFrom<i64>) -> Self {
        Slice::full().with_start(r.start)
    }
}

impl From<RangeTo<i64>> for Slice {
    fn from(r: RangeTo<i64>) -> Self {
        Slice::full().with_stop(r.end)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Slice::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(slice: Slice, len: usize) -> Vec<i64> {
        slice.indices(len).unwrap().iter().collect()
    }

    #[test]
    fn positive_bounds() {
        assert_eq!(resolve(Slice::from(2..), 5), [2, 3, 4]);
        assert_eq!(resolve(Slice::from(..-2), 5), [0, 1, 2]);
        assert_eq!(resolve(Slice::new(1, 4).with_step(2), 5), [1, 3]);
        assert_eq!(resolve(Slice::from(..), 3), [0, 1, 2]);
    }

    #[test]
    fn out_of_range_bounds_are_clamped() {
        assert_eq!(resolve(Slice::new(-100, 100), 3), [0, 1, 2]);
        assert!(resolve(Slice::new(10, 20), 3).is_empty());
        assert!(resolve(Slice::new(2, 1), 3).is_empty());
    }

    #[test]
    fn negative_step_walks_backwards() {
        assert_eq!(resolve(Slice::full().with_step(-1), 4), [3, 2, 1, 0]);
        assert_eq!(resolve(Slice::full().with_step(-2), 5), [4, 2, 0]);
        assert_eq!(resolve(Slice::new(3, 0).with_step(-1), 5), [3, 2, 1]);
        assert_eq!(resolve(Slice::new(-1, -10).with_step(-1), 3), [2, 1, 0]);
    }

    #[test]
    fn empty_sequence() {
        let indices = Slice::full().indices(0).unwrap();
        assert!(indices.is_empty());
        assert_eq!((indices.start, indices.stop), (0, 0));

        assert!(Slice::full().with_step(-1).indices(0).unwrap().is_empty());
    }

    #[test]
    fn len_matches_iteration() {
        for len in 0..7usize {
            for step in [-3, -2, -1, 1, 2, 3] {
                for start in -8..8 {
                    let slice = Slice::full().with_start(start).with_step(step);
                    let indices = slice.indices(len).unwrap();
                    let visited: Vec<i64> = indices.iter().collect();
                    assert_eq!(visited.len(), indices.len());
                    assert!(visited.iter().all(|i| (0..len as i64).contains(i)));
                }
            }
        }
    }

    #[test]
    fn extreme_steps() {
        assert_eq!(resolve(Slice::full().with_step(i64::MIN), 3), [2]);
        assert_eq!(resolve(Slice::full().with_step(i64::MAX), 3), [0]);
        assert_eq!(Slice::full().with_step(i64::MIN).indices(0).unwrap().len(), 0);
        assert!(resolve(Slice::new(1, 0).with_step(i64::MAX), 3).is_empty());
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = Slice::full().with_step(0).indices(3).unwrap_err();
        assert!(matches!(err, Error::InvalidSlice { .. }));
    }
}
