//! Ordered sets of integers stored as disjoint closed intervals.
//!
//! Token types and code points both live here. Vocabularies can span the
//! whole Unicode range, so sets are never enumerated eagerly.

use std::fmt;

use serde::Serialize;

use crate::token::EOF;

/// Closed interval `a..=b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    pub fn single(v: i32) -> Self {
        Self { a: v, b: v }
    }

    pub fn len(&self) -> usize {
        if self.b < self.a {
            0
        } else {
            (self.b as i64 - self.a as i64 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.b < self.a
    }

    pub fn contains(&self, v: i32) -> bool {
        self.a <= v && v <= self.b
    }

    /// Overlapping or directly adjacent, so the two can merge.
    fn touches(&self, other: &Interval) -> bool {
        (self.a as i64) <= other.b as i64 + 1 && (other.a as i64) <= self.b as i64 + 1
    }
}

/// Union of disjoint, non-adjacent intervals kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(v: i32) -> Self {
        let mut set = Self::new();
        set.add(v);
        set
    }

    pub fn of_range(a: i32, b: i32) -> Self {
        let mut set = Self::new();
        set.add_range(a, b);
        set
    }

    pub fn from_values(values: impl IntoIterator<Item = i32>) -> Self {
        let mut set = Self::new();
        for v in values {
            set.add(v);
        }
        set
    }

    pub fn add(&mut self, v: i32) {
        self.add_interval(Interval::single(v));
    }

    pub fn add_range(&mut self, a: i32, b: i32) {
        self.add_interval(Interval::new(a, b));
    }

    pub fn add_interval(&mut self, iv: Interval) {
        if iv.is_empty() {
            return;
        }

        // First interval that ends at or after iv.a - 1.
        let start = self
            .intervals
            .partition_point(|x| (x.b as i64) < iv.a as i64 - 1);
        let mut merged = iv;
        let mut end = start;
        while end < self.intervals.len() && self.intervals[end].touches(&merged) {
            merged.a = merged.a.min(self.intervals[end].a);
            merged.b = merged.b.max(self.intervals[end].b);
            end += 1;
        }
        self.intervals.splice(start..end, [merged]);
    }

    pub fn add_all(&mut self, other: &IntervalSet) {
        for iv in &other.intervals {
            self.add_interval(*iv);
        }
    }

    /// Union of every set in `sets`.
    pub fn or<'a>(sets: impl IntoIterator<Item = &'a IntervalSet>) -> IntervalSet {
        let mut result = IntervalSet::new();
        for set in sets {
            result.add_all(set);
        }
        result
    }

    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = self.clone();
        result.add_all(other);
        result
    }

    pub fn and(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = IntervalSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let x = self.intervals[i];
            let y = other.intervals[j];
            let a = x.a.max(y.a);
            let b = x.b.min(y.b);
            if a <= b {
                result.intervals.push(Interval::new(a, b));
            }
            if x.b < y.b {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }

    pub fn subtract(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = IntervalSet::new();
        for iv in &self.intervals {
            let mut a = iv.a as i64;
            let b = iv.b as i64;
            for cut in &other.intervals {
                if (cut.b as i64) < a {
                    continue;
                }
                if (cut.a as i64) > b {
                    break;
                }
                if (cut.a as i64) > a {
                    result.add_range(a as i32, cut.a - 1);
                }
                a = cut.b as i64 + 1;
                if a > b {
                    break;
                }
            }
            if a <= b {
                result.add_range(a as i32, b as i32);
            }
        }
        result
    }

    /// Everything in `min..=max` that is not in this set.
    pub fn complement(&self, min: i32, max: i32) -> IntervalSet {
        IntervalSet::of_range(min, max).subtract(self)
    }

    pub fn contains(&self, v: i32) -> bool {
        let idx = self.intervals.partition_point(|x| x.b < v);
        self.intervals.get(idx).is_some_and(|x| x.contains(v))
    }

    pub fn remove(&mut self, v: i32) {
        *self = self.subtract(&IntervalSet::of(v));
    }

    pub fn is_nil(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of elements, not intervals.
    pub fn size(&self) -> usize {
        self.intervals.iter().map(Interval::len).sum()
    }

    /// Single element, if this set has exactly one.
    pub fn single_element(&self) -> Option<i32> {
        match self.intervals.as_slice() {
            [iv] if iv.a == iv.b => Some(iv.a),
            _ => None,
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn overlaps(&self, other: &IntervalSet) -> bool {
        !self.and(other).is_nil()
    }

    /// Element iterator in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().flat_map(|iv| iv.a..=iv.b)
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }

    /// Render using `name` for each element, e.g. `{ID, '+', EOF}`.
    pub fn to_string_with(&self, name: impl Fn(i32) -> String) -> String {
        if let Some(single) = self.single_element() {
            return name(single);
        }
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|iv| {
                if iv.a == iv.b {
                    name(iv.a)
                } else {
                    format!("{}..{}", name(iv.a), name(iv.b))
                }
            })
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.to_string_with(|v| {
            if v == EOF {
                "<EOF>".to_string()
            } else {
                v.to_string()
            }
        });
        write!(f, "{s}")
    }
}

impl FromIterator<i32> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self::from_values(iter)
    }
}
