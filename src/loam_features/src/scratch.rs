//! Per-extraction scratch buffers.
//!
//! One arena holds the picked mask and the labels for the whole scan. It is
//! split into disjoint per-ring views so rings can be processed
//! independently, including on different threads.

use crate::error::Result;
use crate::types::{Label, RingBounds, RingRange};

/// Picked mask and labels for every point of one scan.
#[derive(Debug, Clone)]
pub struct ScanScratch {
    picked: Vec<bool>,
    labels: Vec<Label>,
}

impl ScanScratch {
    pub fn new(num_points: usize) -> Self {
        Self {
            picked: vec![false; num_points],
            labels: vec![Label::Unset; num_points],
        }
    }

    /// Split the arena into one mutable view per ring.
    ///
    /// Fails if `bounds` does not describe an arena of this size.
    pub fn ring_views<'a>(&'a mut self, bounds: &RingBounds) -> Result<Vec<RingScratch<'a>>> {
        bounds.validate(self.picked.len())?;

        let mut picked_rest: &'a mut [bool] = self.picked.as_mut_slice();
        let mut labels_rest: &'a mut [Label] = self.labels.as_mut_slice();
        let mut consumed = 0usize;
        let mut views = Vec::with_capacity(bounds.len());

        for (_, range) in bounds.iter() {
            let skip = range.start - consumed;
            let count = range.point_count();

            let (_, tail) = std::mem::take(&mut picked_rest).split_at_mut(skip);
            let (ring_picked, tail) = tail.split_at_mut(count);
            picked_rest = tail;

            let (_, tail) = std::mem::take(&mut labels_rest).split_at_mut(skip);
            let (ring_labels, tail) = tail.split_at_mut(count);
            labels_rest = tail;

            consumed = range.end + 1;
            views.push(RingScratch {
                range,
                picked: ring_picked,
                labels: ring_labels,
            });
        }

        Ok(views)
    }

    pub fn picked(&self) -> &[bool] {
        &self.picked
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn into_parts(self) -> (Vec<bool>, Vec<Label>) {
        (self.picked, self.labels)
    }
}

/// Mutable view of the scratch buffers of a single ring.
///
/// Indexed with global point indices. The picked mask can only be set,
/// never cleared.
#[derive(Debug)]
pub struct RingScratch<'a> {
    range: RingRange,
    picked: &'a mut [bool],
    labels: &'a mut [Label],
}

impl RingScratch<'_> {
    pub fn range(&self) -> RingRange {
        self.range
    }

    fn local(&self, index: usize) -> usize {
        debug_assert!(
            self.range.contains(index),
            "index {index} outside ring [{}, {}]",
            self.range.start,
            self.range.end
        );
        index - self.range.start
    }

    pub fn is_picked(&self, index: usize) -> bool {
        self.picked[self.local(index)]
    }

    pub fn pick(&mut self, index: usize) {
        let local = self.local(index);
        self.picked[local] = true;
    }

    /// Pick every index in `first..=last`.
    pub fn pick_range(&mut self, first: usize, last: usize) {
        let (first, last) = (self.local(first), self.local(last));
        self.picked[first..=last].fill(true);
    }

    pub fn label(&self, index: usize) -> Label {
        self.labels[self.local(index)]
    }

    pub fn set_label(&mut self, index: usize, label: Label) {
        let local = self.local(index);
        debug_assert_eq!(
            self.labels[local],
            Label::Unset,
            "point {index} labeled twice"
        );
        self.labels[local] = label;
    }

    /// Number of picked points in the ring.
    pub fn picked_count(&self) -> usize {
        self.picked.iter().filter(|&&p| p).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;

    #[test]
    fn test_ring_views_are_disjoint() {
        let bounds = RingBounds::new(vec![0, 5, 12], vec![3, 9, 14]).unwrap();
        let mut scratch = ScanScratch::new(16);

        {
            let mut views = scratch.ring_views(&bounds).unwrap();
            assert_eq!(views.len(), 3);
            assert_eq!(views[1].range(), RingRange { start: 5, end: 9 });

            views[0].pick(3);
            views[1].pick_range(6, 8);
            views[2].set_label(12, Label::Sharp);
            assert!(views[1].is_picked(7));
            assert_eq!(views[1].picked_count(), 3);
        }

        let picked = scratch.picked();
        let expected: Vec<usize> = vec![3, 6, 7, 8];
        let actual: Vec<usize> = (0..16).filter(|&i| picked[i]).collect();
        assert_eq!(actual, expected);

        // Points between rings are never touched
        assert!(!picked[4]);
        assert!(!picked[10]);
        assert!(!picked[11]);
        assert_eq!(scratch.labels()[12], Label::Sharp);
    }

    #[test]
    fn test_into_parts() {
        let bounds = RingBounds::from_ring_lengths(&[4]).unwrap();
        let mut scratch = ScanScratch::new(4);
        scratch.ring_views(&bounds).unwrap()[0].set_label(2, Label::Flat);

        let (picked, labels) = scratch.into_parts();
        assert_eq!(picked, vec![false; 4]);
        assert_eq!(labels[2], Label::Flat);
    }

    #[test]
    #[should_panic]
    fn test_index_outside_ring_panics() {
        let bounds = RingBounds::new(vec![0, 5], vec![3, 9]).unwrap();
        let mut scratch = ScanScratch::new(10);
        let mut views = scratch.ring_views(&bounds).unwrap();
        views[0].pick(5);
    }

    #[test]
    fn test_ring_views_reject_foreign_bounds() {
        // Valid on their own, but describe a larger scan than the arena
        let bounds = RingBounds::new(vec![0, 5], vec![3, 9]).unwrap();
        let mut scratch = ScanScratch::new(8);
        assert!(matches!(
            scratch.ring_views(&bounds),
            Err(FeatureError::RingOutOfRange { ring: 1, .. })
        ));

        let overlapping = RingBounds::new(vec![0, 3], vec![4, 7]).unwrap();
        assert!(matches!(
            scratch.ring_views(&overlapping),
            Err(FeatureError::OverlappingRings { ring: 1, .. })
        ));
        assert!(scratch.picked().iter().all(|&p| !p));
    }
}
