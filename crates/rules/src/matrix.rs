use serde::Serialize;

/// Dense `K x K` count matrix, row-major: `counts[true * K + predicted]`.
///
/// One matrix holds a single step's batch; it is never a running total
/// across steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    categories: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(categories: usize) -> Self {
        Self {
            categories,
            counts: vec![0; categories * categories],
        }
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    /// Record one (true, predicted) pair. Labels must already be in range.
    pub(crate) fn record(&mut self, true_class: usize, predicted_class: usize) {
        self.counts[true_class * self.categories + predicted_class] += 1;
    }

    pub fn count(&self, true_class: usize, predicted_class: usize) -> u64 {
        self.counts[true_class * self.categories + predicted_class]
    }

    /// Counts for one true class, indexed by predicted class.
    pub fn row(&self, true_class: usize) -> &[u64] {
        let start = true_class * self.categories;
        &self.counts[start..start + self.categories]
    }

    /// Total correct predictions (sum of the diagonal).
    pub fn diagonal_total(&self) -> u64 {
        (0..self.categories).map(|i| self.count(i, i)).sum()
    }

    /// Total predictions of one class (sum of a column).
    pub fn column_total(&self, predicted_class: usize) -> u64 {
        (0..self.categories)
            .map(|i| self.count(i, predicted_class))
            .sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }
}
