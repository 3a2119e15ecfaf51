//! Cartesian product enumeration
//!
//! Enumerates every combination of N ordered dimensions, one combination at a
//! time. The order is a mixed-radix counter: the last dimension varies
//! fastest and carries into earlier ones, like an odometer.

use std::iter::FusedIterator;

/// Lazily enumerates the Cartesian product of a list of dimensions
#[derive(Debug, Clone)]
pub struct CombinationGenerator<T> {
    dimensions: Vec<Vec<T>>,
    indexes: Vec<usize>,
    exhausted: bool,
}

impl<T: Clone> CombinationGenerator<T> {
    /// Creates a generator over the given dimensions
    ///
    /// If any dimension is empty, or there are no dimensions at all, the
    /// generator yields nothing.
    pub fn new(dimensions: impl IntoIterator<Item = Vec<T>>) -> Self {
        let dimensions: Vec<Vec<T>> = dimensions.into_iter().collect();
        let exhausted = dimensions.is_empty() || dimensions.iter().any(Vec::is_empty);

        Self {
            indexes: vec![0; dimensions.len()],
            dimensions,
            exhausted,
        }
    }

    /// Returns the number of dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns true if at least one more combination remains
    pub fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Returns the next combination, or `None` once exhausted
    ///
    /// Keeps returning `None` on every call after the last combination.
    pub fn next_combination(&mut self) -> Option<Vec<T>> {
        if self.exhausted {
            return None;
        }

        let combination = self
            .indexes
            .iter()
            .zip(&self.dimensions)
            .map(|(&i, dimension)| dimension[i].clone())
            .collect();

        self.advance();

        Some(combination)
    }

    /// Drains all remaining combinations in enumeration order
    pub fn combinations(&mut self) -> Vec<Vec<T>> {
        let mut all = Vec::new();
        while let Some(combination) = self.next_combination() {
            all.push(combination);
        }
        all
    }

    /// Number of combinations not yet returned
    pub fn remaining(&self) -> usize {
        if self.exhausted {
            return 0;
        }

        // Position in the product, read as a mixed-radix number
        let mut consumed = 0usize;
        let mut total = 1usize;
        for (i, dimension) in self.indexes.iter().zip(&self.dimensions) {
            consumed = consumed.saturating_mul(dimension.len()).saturating_add(*i);
            total = total.saturating_mul(dimension.len());
        }
        total - consumed
    }

    fn advance(&mut self) {
        for pos in (0..self.indexes.len()).rev() {
            self.indexes[pos] += 1;
            if self.indexes[pos] < self.dimensions[pos].len() {
                return;
            }
            self.indexes[pos] = 0;
        }

        // Carried out of the first dimension
        self.exhausted = true;
    }
}

impl<T: Clone> Iterator for CombinationGenerator<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_combination()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T: Clone> FusedIterator for CombinationGenerator<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn last_dimension_varies_fastest() {
        let mut generator =
            CombinationGenerator::new(vec![strs(&["A", "B", "C"]), strs(&["A", "B"])]);

        let all = generator.combinations();
        let expected = vec![
            strs(&["A", "A"]),
            strs(&["A", "B"]),
            strs(&["B", "A"]),
            strs(&["B", "B"]),
            strs(&["C", "A"]),
            strs(&["C", "B"]),
        ];

        assert_eq!(all, expected);
    }

    #[test]
    fn sex_by_age() {
        let generator = CombinationGenerator::new(vec![
            strs(&["Male", "Female"]),
            strs(&["<5", "5+"]),
        ]);

        let all: Vec<_> = generator.collect();
        assert_eq!(
            all,
            vec![
                strs(&["Male", "<5"]),
                strs(&["Male", "5+"]),
                strs(&["Female", "<5"]),
                strs(&["Female", "5+"]),
            ]
        );
    }

    #[test]
    fn empty_dimension_yields_nothing() {
        let mut generator =
            CombinationGenerator::new(vec![strs(&["A", "B"]), vec![], strs(&["C"])]);

        assert!(!generator.has_next());
        assert!(generator.combinations().is_empty());
    }

    #[test]
    fn no_dimensions_yields_nothing() {
        let mut generator = CombinationGenerator::<u8>::new(Vec::new());

        assert!(!generator.has_next());
        assert_eq!(generator.next_combination(), None);
    }

    #[test]
    fn exhausted_generator_keeps_returning_none() {
        let mut generator = CombinationGenerator::new(vec![vec![1, 2]]);

        assert_eq!(generator.next_combination(), Some(vec![1]));
        assert_eq!(generator.next_combination(), Some(vec![2]));
        assert!(!generator.has_next());
        assert_eq!(generator.next_combination(), None);
        assert_eq!(generator.next_combination(), None);
        assert_eq!(generator.next_combination(), None);
    }

    #[test]
    fn combinations_drains_only_the_remainder() {
        let mut generator = CombinationGenerator::new(vec![vec![1, 2], vec![3, 4]]);

        assert_eq!(generator.next_combination(), Some(vec![1, 3]));
        assert_eq!(generator.remaining(), 3);
        assert_eq!(
            generator.combinations(),
            vec![vec![1, 4], vec![2, 3], vec![2, 4]]
        );
        assert!(generator.combinations().is_empty());
    }

    #[test]
    fn single_dimension_is_identity() {
        let generator = CombinationGenerator::new(vec![vec!['x', 'y', 'z']]);
        assert_eq!(generator.dimensions(), 1);

        let all: Vec<_> = generator.collect();
        assert_eq!(all, vec![vec!['x'], vec!['y'], vec!['z']]);
    }

    fn nested_product(dimensions: &[Vec<u8>]) -> Vec<Vec<u8>> {
        let mut acc: Vec<Vec<u8>> = vec![vec![]];
        for dimension in dimensions {
            let mut next = Vec::new();
            for prefix in &acc {
                for item in dimension {
                    let mut combination = prefix.clone();
                    combination.push(*item);
                    next.push(combination);
                }
            }
            acc = next;
        }
        acc
    }

    proptest! {
        #[test]
        fn count_is_product_of_sizes(
            dimensions in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..5), 1..5)
        ) {
            let expected: usize = dimensions.iter().map(Vec::len).product();
            let generator = CombinationGenerator::new(dimensions.clone());

            prop_assert_eq!(generator.remaining(), expected);
            prop_assert_eq!(generator.count(), expected);
        }

        #[test]
        fn order_matches_nested_loops(
            dimensions in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 1..5)
        ) {
            let mut generator = CombinationGenerator::new(dimensions.clone());
            let reference = nested_product(&dimensions);
            let expected = if dimensions.iter().any(Vec::is_empty) {
                Vec::new()
            } else {
                reference
            };

            prop_assert_eq!(generator.combinations(), expected);
        }
    }
}
