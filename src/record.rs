use std::cmp::Ordering;

use crate::inline_string::InlineString;

/// A parsed input line.
///
/// `key_id` holds the interning id of the key until the records are remapped, and the rank
/// of the key afterwards. Records order by key, then numeric code, then tail bytes.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    key_id: u64,
    code: u32,
    tail: InlineString,
}

impl Record {
    pub fn new(key_id: u64, code: u32, tail: InlineString) -> Record {
        Record {
            key_id,
            code,
            tail,
        }
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn tail(&self) -> &InlineString {
        &self.tail
    }

    pub(crate) fn set_key_id(&mut self, key_id: u64) {
        self.key_id = key_id;
    }
}

impl Eq for Record {}

impl PartialEq<Self> for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id && self.code == other.code && self.tail == other.tail
    }
}

impl PartialOrd<Self> for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_id.cmp(&other.key_id)
            .then_with(|| self.code.cmp(&other.code))
            .then_with(|| self.tail.cmp(&other.tail))
    }
}
