//! This crate regroups very large keyed text logs. Each line of the input has the form
//! `<key>. <tail><two digit code>`, for example `Smith. NY03`. The output holds one line
//! `<key>. <tail>` per input line, with all lines of a key grouped together and the groups in
//! the collation order of their keys.
//!
//! The whole input is materialized in memory in a compact form: every distinct key is interned
//! once into a dense integer id and every line becomes a fixed size record holding the key id,
//! the numeric code and the tail inline. After the input is consumed the unique keys are ranked
//! with a pluggable [collation::Collator], the records are remapped to key ranks and sorted,
//! and the result is written through a fixed size output buffer.
//!
//! Lines sharing a key are ordered by their numeric code and then by their tail. The numeric
//! code is not part of the output.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use grouped_text_sort::reorder::Reorder;
//!
//! // optimized for use with Jemalloc
//! use tikv_jemallocator::Jemalloc;
//! #[global_allocator]
//! static GLOBAL: Jemalloc = Jemalloc;
//!
//! fn regroup(input: PathBuf, output: PathBuf, record_count: usize) -> Result<(), anyhow::Error> {
//!     let mut reorder = Reorder::new(input, output);
//!
//!     // reserve the record store up front when the number of lines is known, avoiding
//!     // reallocation of a vector holding hundreds of millions of records
//!     reorder.with_record_capacity(record_count);
//!
//!     // lines are read in chunks of this size, no line may be longer
//!     reorder.with_read_buffer_bytes(64 << 20);
//!
//!     reorder.reorder()
//! }
//! ```
//!

pub(crate) mod config;

pub mod buffered_writer;
pub mod collation;
pub mod inline_string;
pub mod key_dictionary;
pub mod line_reader;
pub mod line_scanner;
pub mod order;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod record_store;
pub mod reorder;
