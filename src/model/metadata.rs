use super::{Discipline, Element};
use crate::format::FileFormat;
use std::collections::BTreeMap;

/// Aggregate description of one parsed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMetadata {
    pub file_hash: String,
    pub format: FileFormat,
    pub total_elements: usize,
    /// Non-zero counts only.
    pub elements_by_discipline: BTreeMap<Discipline, usize>,
    pub original_file_name: String,
}

impl ModelMetadata {
    /// The value reported before a successful parse: zeroed counts, `Unknown` format.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds metadata whose counts are derived from `elements`.
    #[must_use]
    pub fn summarize(
        file_hash: String,
        format: FileFormat,
        original_file_name: String,
        elements: &[Element],
    ) -> Self {
        let mut elements_by_discipline = BTreeMap::new();
        for element in elements {
            *elements_by_discipline.entry(element.discipline).or_insert(0) += 1;
        }

        Self {
            file_hash,
            format,
            total_elements: elements.len(),
            elements_by_discipline,
            original_file_name,
        }
    }

    #[must_use]
    pub fn discipline_count(&self, discipline: Discipline) -> usize {
        self.elements_by_discipline
            .get(&discipline)
            .copied()
            .unwrap_or(0)
    }

    /// Checks that the counts agree with the element sequence they describe.
    #[must_use]
    pub fn is_consistent(&self, elements: &[Element]) -> bool {
        let sum: usize = self.elements_by_discipline.values().sum();
        sum == self.total_elements
            && self.total_elements == elements.len()
            && Discipline::ALL.iter().all(|d| {
                self.discipline_count(*d) == elements.iter().filter(|e| e.discipline == *d).count()
            })
    }
}
