use crate::diagnosis::DiagnosisRecord;

/// Append-only record collection for one evaluation run.
///
/// Insertion order is report order; there is no removal.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisRecordStore {
    records: Vec<DiagnosisRecord>,
}

impl DiagnosisRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: DiagnosisRecord) {
        self.records.push(record);
    }

    /// Fresh iterator over the records in insertion order; may be called any number of times.
    pub fn all(&self) -> impl Iterator<Item = &DiagnosisRecord> + Clone + '_ {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[DiagnosisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Extend<DiagnosisRecord> for DiagnosisRecordStore {
    fn extend<T: IntoIterator<Item = DiagnosisRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
