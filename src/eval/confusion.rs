use serde::{Deserialize, Serialize};

use crate::diagnosis::DiagnosisRecord;

#[cfg(feature = "mt")]
use rayon::prelude::*;

/// Square expected × predicted count table, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    classes: usize,
    cells: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> Self {
        Self {
            classes,
            cells: vec![0; classes * classes],
        }
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Counts one labeled outcome. Returns false, leaving the matrix untouched,
    /// when either index is outside the table.
    pub fn increment(&mut self, expected: usize, predicted: usize) -> bool {
        if expected >= self.classes || predicted >= self.classes {
            return false;
        }
        self.cells[expected * self.classes + predicted] += 1;
        true
    }

    pub fn get(&self, expected: usize, predicted: usize) -> u64 {
        if expected >= self.classes || predicted >= self.classes {
            return 0;
        }
        self.cells[expected * self.classes + predicted]
    }

    /// Counts for one expected class; empty when `expected` is outside the table.
    pub fn row(&self, expected: usize) -> &[u64] {
        if expected >= self.classes {
            return &[];
        }
        let start = expected * self.classes;
        &self.cells[start..start + self.classes]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks(self.classes.max(1))
    }

    pub fn row_sum(&self, expected: usize) -> u64 {
        self.row(expected).iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn diagonal_sum(&self) -> u64 {
        (0..self.classes).map(|i| self.get(i, i)).sum()
    }

    /// Adds another matrix of the same size cell by cell.
    pub fn merge(mut self, other: &ConfusionMatrix) -> Self {
        debug_assert_eq!(self.classes, other.classes);
        for (a, b) in self.cells.iter_mut().zip(&other.cells) {
            *a += *b;
        }
        self
    }

    /// Most frequent wrong prediction for `expected`; lowest index on ties,
    /// `None` when the row has no off-diagonal counts.
    pub fn top_misclassification(&self, expected: usize) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (predicted, &count) in self.row(expected).iter().enumerate() {
            if predicted == expected || count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((predicted, count)),
            }
        }
        best.map(|(predicted, _)| predicted)
    }

    /// Builds the matrix from every record carrying an in-range ground-truth label.
    pub fn from_records(records: &[DiagnosisRecord], classes: usize) -> Self {
        #[cfg(feature = "mt")]
        {
            return records
                .par_iter()
                .fold(
                    || ConfusionMatrix::new(classes),
                    |mut m, r| {
                        if let Some(expected) = r.expected_index {
                            m.increment(expected, r.predicted_index);
                        }
                        m
                    },
                )
                .reduce(|| ConfusionMatrix::new(classes), |a, b| a.merge(&b));
        }

        #[cfg(not(feature = "mt"))]
        {
            let mut m = ConfusionMatrix::new(classes);
            for r in records {
                if let Some(expected) = r.expected_index {
                    m.increment(expected, r.predicted_index);
                }
            }
            m
        }
    }
}
