use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use regex::bytes::Regex;
use tempfile::{Builder, NamedTempFile};

use crate::buffered_writer::BufferedWriter;
use crate::collation::{ByteCollator, Collation, Collator, NaturalCollator};
use crate::config::{CapacityHint, Config};
use crate::line_reader::{count_lines, LineReader};
use crate::line_scanner::KEY_DELIMITER;
use crate::order::Order;
use crate::pipeline::Pipeline;

pub(crate) fn create_tmp_file(config: &Config) -> Result<NamedTempFile, anyhow::Error> {
    Builder::new()
        .prefix(config.tmp_prefix())
        .suffix(config.tmp_suffix())
        .tempfile_in(config.tmp())
        .with_context(|| anyhow!("Failed to create new temp file in {}", config.tmp().display()))
}

/// Group the lines of a keyed text log by key, keys in collation order.
///
/// Every input line has the form `<key>. <tail><two digit code>`. The output holds one line
/// `<key>. <tail>` per input line, lines sharing a key are grouped together, groups follow the
/// collation order of their keys and lines within a group are ordered by code, then tail.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use grouped_text_sort::collation::Collation;
/// use grouped_text_sort::reorder::Reorder;
///
/// fn regroup(input: PathBuf, output: PathBuf) -> Result<(), anyhow::Error> {
///     let mut reorder = Reorder::new(input, output);
///     // rank keys with the rules of an installed locale instead of the built in natural order
///     reorder.with_collation(Collation::Locale("en_US.UTF-8".to_string()));
///     // the record store is sized from a line count pre-pass instead of an estimate
///     reorder.with_count_lines();
///     reorder.reorder()
/// }
/// ```
pub struct Reorder {
    input: PathBuf,
    output: PathBuf,
    tmp: Option<PathBuf>,
    read_buffer_bytes: usize,
    write_buffer_bytes: usize,
    capacity: CapacityHint,
    collation: Collation,
    order: Order,
    ignore_empty: bool,
    ignore_lines: Option<Regex>,
}

impl Reorder {
    /// Create a default Reorder definition.
    ///
    /// * keys are ranked with [Collation::Natural]
    /// * default [Order] is Asc
    /// * input is read in chunks of 16 MiB respecting line boundaries
    /// * output is written in blocks of 1 MiB
    /// * the record store is sized from the first chunk and the input size
    /// * intermediate output is written next to the output file
    /// * every line must be well formed, empty lines are not ignored
    pub fn new(input: PathBuf, output: PathBuf) -> Reorder {
        Reorder {
            input,
            output,
            tmp: None,
            read_buffer_bytes: 16 << 20,
            write_buffer_bytes: 1 << 20,
            capacity: CapacityHint::Estimate,
            collation: Collation::Natural,
            order: Order::Asc,
            ignore_empty: false,
            ignore_lines: None,
        }
    }

    /// Set directory for the intermediate output file. By default the directory of the output
    /// file is used, the directory must be on the same file system as the output.
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = Some(tmp);
    }

    /// Set the [Collation] used to rank keys
    pub fn with_collation(&mut self, collation: Collation) {
        self.collation = collation;
    }

    /// Set [Order]
    pub fn with_order(&mut self, order: Order) {
        self.order = order;
    }

    /// Reserve room for `records` records before parsing
    pub fn with_record_capacity(&mut self, records: usize) {
        self.capacity = CapacityHint::Exact(records);
    }

    /// Count the input lines before parsing to size the record store exactly
    pub fn with_count_lines(&mut self) {
        self.capacity = CapacityHint::CountLines;
    }

    /// The input will be read in chunks of `read_buffer_bytes` respecting line boundaries. No
    /// line may be longer than this.
    pub fn with_read_buffer_bytes(&mut self, read_buffer_bytes: usize) {
        self.read_buffer_bytes = read_buffer_bytes;
    }

    /// The output will be written in blocks of `write_buffer_bytes`. No key may be longer than
    /// this.
    pub fn with_write_buffer_bytes(&mut self, write_buffer_bytes: usize) {
        self.write_buffer_bytes = write_buffer_bytes;
    }

    /// Direct the algorithm to ignore empty lines. The default is false
    pub fn with_ignore_empty(&mut self) {
        self.ignore_empty = true;
    }

    /// Specify which lines to ignore. Each line matching the regex will be ignored and will not
    /// appear in the output.
    pub fn with_ignore_lines(&mut self, r: Regex) {
        self.ignore_lines = Some(r)
    }

    fn create_config(&self) -> Config {
        let tmp = match &self.tmp {
            Some(tmp) => {
                tmp.clone()
            }
            None => {
                match self.output.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                }
            }
        };

        Config::new(
            self.input.clone(),
            self.output.clone(),
            tmp,
            "reorder-".to_string(),
            ".partial".to_string(),
            self.read_buffer_bytes,
            self.write_buffer_bytes,
            self.capacity.clone(),
            self.collation.clone(),
            self.order.clone(),
            self.ignore_empty,
            self.ignore_lines.clone(),
        )
    }

    /// Reorder the input file into the output file
    pub fn reorder(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config();
        Self::internal_reorder(&config)
    }

    /// Check that the output file is grouped and its keys follow the configured collation and
    /// [Order]
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let config = self.create_config();
        match config.collation() {
            Collation::Bytes => {
                Self::internal_check(config.output(), &ByteCollator, config.order())
            }
            Collation::Natural => {
                Self::internal_check(config.output(), &NaturalCollator, config.order())
            }
            Collation::Locale(name) => {
                Self::check_with_locale(config.output(), name, config.order())
            }
        }
    }

    pub(crate) fn internal_check<C: Collator>(path: &PathBuf, collator: &C, order: &Order) -> Result<bool, anyhow::Error> {
        let mut reader = BufReader::new(
            File::open(path).with_context(|| anyhow!("path: {}", path.display()))?
        );
        let mut line = Vec::new();
        let mut previous: Option<(String, C::SortKey)> = None;
        let mut n = 0;
        while reader.read_until(b'\n', &mut line)? != 0 {
            n += 1;
            let delimiter = memchr::memmem::find(&line, KEY_DELIMITER)
                .ok_or_else(|| anyhow!("path: {}, line: {}, key delimiter not found", path.display(), n))?;
            let key = std::str::from_utf8(&line[..delimiter])
                .with_context(|| anyhow!("path: {}, line: {}", path.display(), n))?;
            let is_same_key = match &previous {
                Some((previous_key, _)) => previous_key == key,
                None => false,
            };
            if !is_same_key {
                let sort_key = collator.sort_key(key)?;
                if let Some((_, previous_sort_key)) = &previous {
                    let in_order = match order {
                        Order::Asc => collator.compare(previous_sort_key, &sort_key).is_lt(),
                        Order::Desc => collator.compare(previous_sort_key, &sort_key).is_gt(),
                    };
                    if !in_order {
                        log::info!("Line {} of {} is out of order, key: {}", n, path.display(), key);
                        return Ok(false);
                    }
                }
                previous = Some((key.to_string(), sort_key));
            }
            line.clear();
        }
        Ok(true)
    }

    #[cfg(target_os = "linux")]
    fn check_with_locale(path: &PathBuf, name: &str, order: &Order) -> Result<bool, anyhow::Error> {
        let collator = crate::collation::LocaleCollator::new(name)?;
        Self::internal_check(path, &collator, order)
    }

    #[cfg(not(target_os = "linux"))]
    fn check_with_locale(_path: &PathBuf, name: &str, _order: &Order) -> Result<bool, anyhow::Error> {
        Err(anyhow!("Locale collation is not supported on this platform, locale: {}", name))
    }

    #[cfg(target_os = "linux")]
    fn sort_with_locale(pipeline: &mut Pipeline, name: &str, order: &Order) -> Result<(), anyhow::Error> {
        let collator = crate::collation::LocaleCollator::new(name)?;
        pipeline.sort_and_remap(&collator, order)
    }

    #[cfg(not(target_os = "linux"))]
    fn sort_with_locale(_pipeline: &mut Pipeline, name: &str, _order: &Order) -> Result<(), anyhow::Error> {
        Err(anyhow!("Locale collation is not supported on this platform, locale: {}", name))
    }

    fn record_capacity(config: &Config) -> Result<usize, anyhow::Error> {
        match config.capacity() {
            CapacityHint::Estimate => {
                Ok(0)
            }
            CapacityHint::Exact(records) => {
                Ok(*records)
            }
            CapacityHint::CountLines => {
                let file = File::open(config.input())
                    .with_context(|| anyhow!("path: {}", config.input().display()))?;
                let lines = count_lines(file, config.read_buffer_bytes())
                    .with_context(|| anyhow!("path: {}", config.input().display()))?;
                log::info!("Counted {} lines in {}", lines, config.input().display());
                Ok(lines as usize)
            }
        }
    }

    fn internal_reorder(config: &Config) -> Result<(), anyhow::Error> {
        log::info!("Start reorder of {}", config.input().display());
        let start = Instant::now();
        let input_length = config.input().metadata()
            .with_context(|| anyhow!("path: {}", config.input().display()))?
            .len();
        log::info!("Input length: {} bytes", input_length);

        let capacity = Self::record_capacity(config)?;
        let mut pipeline = Pipeline::with_capacity(capacity)
            .with_ignore_empty(config.ignore_empty())
            .with_ignore_lines(config.ignore_lines().clone());
        log::info!("Reserved {} MiB for {} records", pipeline.records().allocated_bytes() >> 20, capacity);

        let mut line_reader = LineReader::open(config.input(), config.read_buffer_bytes())?;
        let projection = match config.capacity() {
            CapacityHint::Estimate => Some(input_length),
            _ => None,
        };
        pipeline.ingest(&mut line_reader, projection)
            .with_context(|| anyhow!("path: {}", config.input().display()))?;
        drop(line_reader);
        log::info!("Finished parsing in {} ms", start.elapsed().as_millis());

        match config.collation() {
            Collation::Bytes => {
                pipeline.sort_and_remap(&ByteCollator, config.order())?
            }
            Collation::Natural => {
                pipeline.sort_and_remap(&NaturalCollator, config.order())?
            }
            Collation::Locale(name) => {
                Self::sort_with_locale(&mut pipeline, name, config.order())?
            }
        }
        log::info!("Finished sorting in {} ms", start.elapsed().as_millis());

        let tmp_file = create_tmp_file(config)?;
        let mut writer = BufferedWriter::new(tmp_file, config.write_buffer_bytes())?;
        pipeline.write(&mut writer)
            .with_context(|| anyhow!("path: {}", config.output().display()))?;
        let tmp_file = writer.finish()
            .with_context(|| anyhow!("path: {}", config.output().display()))?;
        tmp_file.persist(config.output())
            .with_context(|| anyhow!("Persist output to {}", config.output().display()))?;
        log::info!("Finish reorder of {} in {} ms", config.input().display(), start.elapsed().as_millis());
        Ok(())
    }
}
