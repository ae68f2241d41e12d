//! Split candidates and split configuration.
//!
//! A [`Split`] describes a cut plane perpendicular to an axis at a relative
//! position within a box's bounds. The tree evaluates a [`SplitSet`] of
//! candidates and picks the one that partitions the items most evenly.

use std::fmt;

use crate::range::{Axis, Range3};
use crate::tolerance::DEFAULT_TOLERANCE;

/// A cut perpendicular to `axis` at parameter `s` within the box range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub axis: Axis,
    pub s: f64,
}

impl Split {
    pub fn new(axis: Axis, s: f64) -> Self {
        Self { axis, s }
    }

    /// `n` evenly spaced splits along `axis`, excluding the bounds.
    ///
    /// For `n = 3` the parameters are 0.25, 0.5 and 0.75.
    pub fn create_splits(axis: Axis, n: usize) -> Vec<Split> {
        let step = 1.0 / (n as f64 + 1.0);
        (1..=n).map(|i| Split::new(axis, step * i as f64)).collect()
    }

    /// Coordinate of the cut plane along the split axis.
    pub fn cut_value(&self, bounds: &Range3) -> f64 {
        bounds.axis_range(self.axis).value(self.s)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Split[{}, {}]", self.axis, self.s)
    }
}

/// An ordered collection of split candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSet {
    splits: Vec<Split>,
}

impl SplitSet {
    /// An empty candidate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single candidate.
    pub fn add_split(&mut self, split: Split) {
        self.splits.push(split);
    }

    /// Appends `n` evenly spaced splits along `axis`. Returns the new splits.
    pub fn add_splits(&mut self, axis: Axis, n: usize) -> &[Split] {
        let start = self.splits.len();
        self.splits.extend(Split::create_splits(axis, n));
        &self.splits[start..]
    }

    /// `n` evenly spaced splits along each axis.
    pub fn uniform(n: usize) -> Self {
        let mut set = Self::new();
        for axis in Axis::ALL {
            set.add_splits(axis, n);
        }
        set
    }

    /// Number of candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Returns `true` if there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// The candidate at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Option<&Split> {
        self.splits.get(index)
    }

    /// Iterates over the candidates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Split> {
        self.splits.iter()
    }

    /// Removes all candidates.
    pub fn clear(&mut self) {
        self.splits.clear();
    }
}

impl FromIterator<Split> for SplitSet {
    fn from_iter<I: IntoIterator<Item = Split>>(iter: I) -> Self {
        Self {
            splits: iter.into_iter().collect(),
        }
    }
}

/// Parameters for [`BoxTree::split`](super::BoxTree::split).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    /// Split the resulting children again with the same options.
    pub recursive: bool,
    /// Minimum number of items on either side of an acceptable split.
    /// When recursive, boxes with at most this many items are not split.
    pub min_items: usize,
    /// Depth at which recursive splitting stops.
    pub max_level: Option<u32>,
    pub tolerance: f64,
    /// Prefer a split along the longest box axis when its balance is
    /// within `longest_axis_tolerance` of the best split.
    pub prefer_longest_axis: bool,
    pub longest_axis_tolerance: f64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            min_items: 1,
            max_level: None,
            tolerance: DEFAULT_TOLERANCE,
            prefer_longest_axis: false,
            longest_axis_tolerance: 0.0,
        }
    }
}

impl SplitOptions {
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_min_items(mut self, min_items: usize) -> Self {
        self.min_items = min_items;
        self
    }

    pub fn with_max_level(mut self, max_level: Option<u32>) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enables the longest-axis preference with the given tolerance.
    pub fn with_longest_axis(mut self, tolerance: f64) -> Self {
        self.prefer_longest_axis = true;
        self.longest_axis_tolerance = tolerance;
        self
    }
}
