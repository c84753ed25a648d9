//! Ordered sets of pivot rows.
//!
//! A [`PivotSet`] stores the selected rows of a matrix in the order in which
//! they were chosen, together with the inverse map from a row index to its
//! position in the set. If `ind[j] = k` then `position(k) = Some(j)`. Rows
//! that are not pivots map to `None`. Membership tests, swaps and appends are
//! therefore all O(1).

use ndarray::Array1;

#[derive(Clone, Debug)]
pub struct PivotSet {
    ind: Vec<usize>,
    position: Vec<Option<usize>>,
    capacity: usize,
}

impl PivotSet {
    /// Create an empty pivot set for a matrix with `nrows` rows that can hold
    /// at most `capacity` pivots.
    pub fn new(nrows: usize, capacity: usize) -> Self {
        assert!(capacity <= nrows, "Require capacity <= nrows");
        PivotSet {
            ind: Vec::with_capacity(capacity),
            position: vec![None; nrows],
            capacity,
        }
    }

    /// Create a pivot set from the given rows, in order.
    pub fn from_rows<I: IntoIterator<Item = usize>>(nrows: usize, capacity: usize, rows: I) -> Self {
        let mut pivots = PivotSet::new(nrows, capacity);
        for row in rows {
            pivots.push(row);
        }
        pivots
    }

    /// Number of pivots
    pub fn len(&self) -> usize {
        self.ind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ind.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, row: usize) -> bool {
        self.position[row].is_some()
    }

    /// Position of `row` in the pivot set.
    pub fn position(&self, row: usize) -> Option<usize> {
        self.position[row]
    }

    /// Append `row` and return its position.
    pub fn push(&mut self, row: usize) -> usize {
        assert!(self.ind.len() < self.capacity, "Pivot set is full");
        assert!(!self.contains(row), "Row {} is already a pivot", row);

        let pos = self.ind.len();
        self.ind.push(row);
        self.position[row] = Some(pos);
        pos
    }

    /// Put `row` at position `pos` and return the row it replaces.
    pub fn replace(&mut self, pos: usize, row: usize) -> usize {
        assert!(!self.contains(row), "Row {} is already a pivot", row);

        let old = std::mem::replace(&mut self.ind[pos], row);
        self.position[old] = None;
        self.position[row] = Some(pos);
        old
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> + '_ {
        self.ind.iter()
    }

    pub fn into_array(self) -> Array1<usize> {
        Array1::from(self.ind)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_push_and_lookup() {
        let mut pivots = PivotSet::new(10, 3);
        assert!(pivots.is_empty());

        assert_eq!(pivots.push(7), 0);
        assert_eq!(pivots.push(2), 1);

        assert_eq!(pivots.len(), 2);
        assert_eq!(pivots.position(7), Some(0));
        assert_eq!(pivots.position(2), Some(1));
        assert_eq!(pivots.position(3), None);
        assert!(pivots.iter().copied().eq(vec![7, 2]));
    }

    #[test]
    fn test_replace_updates_inverse() {
        let mut pivots = PivotSet::from_rows(6, 3, vec![0, 1, 2]);

        let old = pivots.replace(1, 5);

        assert_eq!(old, 1);
        assert!(!pivots.contains(1));
        assert_eq!(pivots.position(5), Some(1));
        assert_eq!(pivots.into_array(), ndarray::array![0_usize, 5, 2]);
    }

    #[test]
    #[should_panic]
    fn test_duplicate_push_panics() {
        let mut pivots = PivotSet::new(4, 4);
        pivots.push(1);
        pivots.push(1);
    }

    #[test]
    #[should_panic]
    fn test_push_beyond_capacity_panics() {
        let mut pivots = PivotSet::new(4, 1);
        pivots.push(0);
        pivots.push(1);
    }
}
