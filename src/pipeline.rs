use std::io::{Read, Seek, Write};

use anyhow::{anyhow, Context};
use regex::bytes::Regex;

use crate::buffered_writer::BufferedWriter;
use crate::collation::Collator;
use crate::key_dictionary::KeyDictionary;
use crate::line_reader::LineReader;
use crate::line_scanner::{LineScanner, KEY_DELIMITER};
use crate::order::Order;
use crate::ranking::KeyRanking;
use crate::record::Record;
use crate::record_store::RecordStore;

/// State of one reorder run: the key dictionary and the parsed records.
///
/// Lines are ingested chunk by chunk, then [Pipeline::sort_and_remap] orders the records by
/// key rank and [Pipeline::write] serializes them as `<key>. <tail>\n`.
///
/// # Examples
/// ```
/// use grouped_text_sort::buffered_writer::BufferedWriter;
/// use grouped_text_sort::collation::NaturalCollator;
/// use grouped_text_sort::order::Order;
/// use grouped_text_sort::pipeline::Pipeline;
///
/// fn regroup(input: &[u8]) -> Result<Vec<u8>, anyhow::Error> {
///     let mut pipeline = Pipeline::new();
///     pipeline.ingest_chunk(input)?;
///     pipeline.sort_and_remap(&NaturalCollator, &Order::Asc)?;
///     let mut writer = BufferedWriter::new(Vec::new(), 1024)?;
///     pipeline.write(&mut writer)?;
///     writer.finish()
/// }
///
/// let output = regroup(b"Smith. NY03\nAdams. CA01\n").unwrap();
/// assert_eq!(output, b"Adams. CA\nSmith. NY\n".to_vec());
/// ```
#[derive(Debug, Default)]
pub struct Pipeline {
    dictionary: KeyDictionary,
    records: RecordStore,
    ignore_empty: bool,
    ignore_lines: Option<Regex>,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline::with_capacity(0)
    }

    /// Create a pipeline with room for `records` records
    pub fn with_capacity(records: usize) -> Pipeline {
        Pipeline {
            dictionary: KeyDictionary::new(),
            records: RecordStore::with_capacity(records),
            ignore_empty: false,
            ignore_lines: None,
        }
    }

    /// Skip empty and whitespace only lines instead of failing on them
    pub fn with_ignore_empty(mut self, ignore_empty: bool) -> Pipeline {
        self.ignore_empty = ignore_empty;
        self
    }

    /// Skip lines matching `ignore_lines`
    pub fn with_ignore_lines(mut self, ignore_lines: Option<Regex>) -> Pipeline {
        self.ignore_lines = ignore_lines;
        self
    }

    pub fn dictionary(&self) -> &KeyDictionary {
        &self.dictionary
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Parse every line of `chunk` and append it as a record. Returns the number of records
    /// added.
    pub fn ingest_chunk(&mut self, chunk: &[u8]) -> Result<usize, anyhow::Error> {
        let scanner = LineScanner::new(chunk)
            .with_ignore_empty(self.ignore_empty)
            .with_ignore_lines(self.ignore_lines.as_ref());
        let mut added = 0;
        for line in scanner {
            let line = line?;
            let key_id = self.dictionary.intern(line.key());
            self.records.push(Record::new(key_id, line.code(), line.tail()));
            added += 1;
        }
        Ok(added)
    }

    /// Consume `line_reader` to the end of its input. When `input_length` is given the record
    /// store is grown after the first chunk to the record count projected for the whole input.
    pub fn ingest<R: Read + Seek>(&mut self, line_reader: &mut LineReader<R>, input_length: Option<u64>) -> Result<u64, anyhow::Error> {
        let mut bytes: u64 = 0;
        let mut first = true;
        loop {
            let chunk = line_reader.next_chunk()?;
            if chunk.is_empty() {
                break;
            }
            let chunk_length = chunk.len() as u64;
            let offset = bytes;
            self.ingest_chunk(chunk)
                .with_context(|| anyhow!("chunk offset: {}", offset))?;
            bytes += chunk_length;

            if first {
                first = false;
                if let Some(total) = input_length {
                    self.reserve_projected(chunk_length, total);
                }
            }
        }
        log::info!(
            "Ingested {} bytes, records: {}, unique keys: {}",
            bytes,
            self.records.len(),
            self.dictionary.len()
        );
        Ok(bytes)
    }

    fn reserve_projected(&mut self, sampled_bytes: u64, total_bytes: u64) {
        if sampled_bytes == 0 || self.records.is_empty() {
            return;
        }
        let projected = (self.records.len() as u128 * total_bytes as u128 / sampled_bytes as u128) as usize;
        if projected > self.records.capacity() {
            self.records.reserve(projected - self.records.len());
            log::info!(
                "Reserved {} MiB for {} projected records",
                self.records.allocated_bytes() >> 20,
                projected
            );
        }
    }

    /// Rank the unique keys with `collator`, rewrite every record's key id to its rank and sort
    /// the records by rank, numeric code and tail. Key ids in the dictionary are renumbered to
    /// ranks as well, so running this again leaves the state unchanged.
    pub fn sort_and_remap<C: Collator>(&mut self, collator: &C, order: &Order) -> Result<(), anyhow::Error> {
        let ranking = KeyRanking::new(&self.dictionary, collator, order)?;
        let ranks = ranking.inverse();
        self.records.remap(&ranks);
        self.dictionary.renumber(&ranking);
        self.records.sort();
        Ok(())
    }

    pub fn write<W: Write>(&self, writer: &mut BufferedWriter<W>) -> Result<(), anyhow::Error> {
        for record in self.records.records() {
            writer.append(self.dictionary.text_of(record.key_id()).as_bytes())?;
            writer.append(KEY_DELIMITER)?;
            writer.append(record.tail().as_bytes())?;
            writer.append(b"\n")?;
        }
        Ok(())
    }
}
