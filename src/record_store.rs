use std::mem::size_of;

use crate::record::Record;

/// Append only storage for parsed records, sorted in place once the input is consumed.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> RecordStore {
        RecordStore {
            records: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> RecordStore {
        RecordStore {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Make room for at least `additional` more records.
    pub fn reserve(&mut self, additional: usize) {
        self.records.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Bytes held by the record vector, including unused capacity
    pub fn allocated_bytes(&self) -> usize {
        self.records.capacity() * size_of::<Record>()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace every key id with `ranks[key_id]`.
    pub(crate) fn remap(&mut self, ranks: &[u64]) {
        for record in self.records.iter_mut() {
            record.set_key_id(ranks[record.key_id() as usize]);
        }
    }

    // records equal in key, code and tail are indistinguishable, stability is not needed
    pub(crate) fn sort(&mut self) {
        self.records.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use crate::inline_string::InlineString;
    use crate::record::Record;
    use crate::record_store::RecordStore;

    #[test]
    fn test_remap_and_sort() -> Result<(), anyhow::Error> {
        let mut store = RecordStore::with_capacity(4);
        assert!(store.capacity() >= 4);
        store.push(Record::new(0, 3, InlineString::new(b"NY")?));
        store.push(Record::new(1, 1, InlineString::new(b"CA")?));
        store.push(Record::new(0, 1, InlineString::new(b"NJ")?));
        store.remap(&[1, 0]);
        store.sort();
        let keys: Vec<(u64, u32)> = store.records().iter().map(|r| (r.key_id(), r.code())).collect();
        assert_eq!(keys, vec![(0, 1), (1, 1), (1, 3)]);
        assert_eq!(store.len(), 3);
        Ok(())
    }
}
