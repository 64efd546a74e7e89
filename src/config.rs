use std::path::PathBuf;

use regex::bytes::Regex;

use crate::collation::Collation;
use crate::order::Order;

/// How the record store is sized before parsing
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CapacityHint {
    /// Extrapolate from the first chunk to the input size
    Estimate,
    /// Reserve exactly this many records
    Exact(usize),
    /// Count the input lines in a pre-pass
    CountLines,
}

#[derive(Clone)]
pub(crate) struct Config {
    input: PathBuf,
    output: PathBuf,
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    read_buffer_bytes: usize,
    write_buffer_bytes: usize,
    capacity: CapacityHint,
    collation: Collation,
    order: Order,
    ignore_empty: bool,
    ignore_lines: Option<Regex>,
}

impl Config {
    pub(crate) fn new(
        input: PathBuf,
        output: PathBuf,
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        read_buffer_bytes: usize,
        write_buffer_bytes: usize,
        capacity: CapacityHint,
        collation: Collation,
        order: Order,
        ignore_empty: bool,
        ignore_lines: Option<Regex>,
    ) -> Config {
        Config {
            input,
            output,
            tmp,
            tmp_prefix,
            tmp_suffix,
            read_buffer_bytes,
            write_buffer_bytes,
            capacity,
            collation,
            order,
            ignore_empty,
            ignore_lines,
        }
    }

    pub(crate) fn input(&self) -> &PathBuf {
        &self.input
    }

    pub(crate) fn output(&self) -> &PathBuf {
        &self.output
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    pub(crate) fn read_buffer_bytes(&self) -> usize {
        self.read_buffer_bytes
    }

    pub(crate) fn write_buffer_bytes(&self) -> usize {
        self.write_buffer_bytes
    }

    pub(crate) fn capacity(&self) -> &CapacityHint {
        &self.capacity
    }

    pub(crate) fn collation(&self) -> &Collation {
        &self.collation
    }

    pub(crate) fn order(&self) -> &Order {
        &self.order
    }

    pub(crate) fn ignore_empty(&self) -> bool {
        self.ignore_empty
    }

    pub(crate) fn ignore_lines(&self) -> &Option<Regex> {
        &self.ignore_lines
    }
}
