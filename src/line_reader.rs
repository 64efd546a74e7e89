use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::PathBuf;

use anyhow::{anyhow, Context};

/// Reads a source in chunks of complete lines.
///
/// Every call to [LineReader::next_chunk] fills a fixed size buffer from the source and
/// returns the longest prefix of the buffer that ends with a line terminator. The bytes after
/// the last terminator are given back to the source by seeking backwards, so the next chunk
/// starts at a line boundary.
pub struct LineReader<R: Read + Seek> {
    reader: R,
    buffer: Vec<u8>,
    pos: u64,
    chunk_offset: u64,
    done: bool,
}

impl LineReader<File> {
    pub fn open(path: &PathBuf, capacity: usize) -> Result<LineReader<File>, anyhow::Error> {
        let file = File::open(path)
            .with_context(|| anyhow!("path: {}", path.display()))?;
        LineReader::new(file, capacity)
            .with_context(|| anyhow!("path: {}", path.display()))
    }
}

impl<R: Read + Seek> LineReader<R> {
    pub fn new(reader: R, capacity: usize) -> Result<LineReader<R>, anyhow::Error> {
        if capacity == 0 {
            return Err(anyhow!("Read buffer capacity must be greater than zero"));
        }
        Ok(
            LineReader {
                reader,
                buffer: vec![0u8; capacity],
                pos: 0,
                chunk_offset: 0,
                done: false,
            }
        )
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Input offset of the chunk most recently returned by [LineReader::next_chunk]
    pub fn offset(&self) -> u64 {
        self.chunk_offset
    }

    /// Next run of complete lines, terminator included. An empty slice marks the end of input.
    pub fn next_chunk(&mut self) -> Result<&[u8], anyhow::Error> {
        if self.done {
            return Ok(&[]);
        }

        let filled = self.fill()?;
        if filled == 0 {
            self.done = true;
            return Ok(&[]);
        }

        let end = if filled < self.buffer.len() {
            self.done = true;
            if self.buffer[filled - 1] != b'\n' {
                let start = memchr::memrchr(b'\n', &self.buffer[..filled]).map_or(0, |p| p + 1);
                return Err(
                    anyhow!(
                        "Input ends with an unterminated line at offset {}: {}",
                        self.pos + start as u64,
                        String::from_utf8_lossy(&self.buffer[start..filled])
                    )
                );
            }
            filled
        } else if self.buffer[filled - 1] == b'\n' {
            filled
        } else {
            match memchr::memrchr(b'\n', &self.buffer[..filled]) {
                Some(last) => {
                    let held_back = filled - last - 1;
                    self.reader.seek(SeekFrom::Current(-(held_back as i64)))
                        .with_context(|| anyhow!("Failed to seek back {} bytes at offset {}", held_back, self.pos))?;
                    last + 1
                }
                None => {
                    return Err(
                        anyhow!(
                            "Line at offset {} is longer than the read buffer of {} bytes",
                            self.pos,
                            self.buffer.len()
                        )
                    );
                }
            }
        };

        self.chunk_offset = self.pos;
        self.pos += end as u64;
        log::debug!("Read chunk, offset: {}, length: {}", self.chunk_offset, end);
        Ok(&self.buffer[..end])
    }

    fn fill(&mut self) -> Result<usize, anyhow::Error> {
        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    break;
                }
                Ok(n) => {
                    filled += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(e).with_context(|| anyhow!("Failed to read at offset {}", self.pos + filled as u64));
                }
            }
        }
        Ok(filled)
    }
}

/// Count line terminators of a source, reading it in blocks of `capacity` bytes.
pub fn count_lines<R: Read>(mut reader: R, capacity: usize) -> Result<u64, anyhow::Error> {
    let mut buffer = vec![0u8; capacity.max(1)];
    let mut lines = 0;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => {
                break;
            }
            Ok(n) => {
                n
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| "Failed to count lines");
            }
        };
        lines += memchr::memchr_iter(b'\n', &buffer[..n]).count() as u64;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::PathBuf;

    use crate::line_reader::{count_lines, LineReader};

    fn read_all(input: &[u8], capacity: usize) -> Result<(Vec<u8>, usize), anyhow::Error> {
        let mut line_reader = LineReader::new(Cursor::new(input.to_vec()), capacity)?;
        let mut output = Vec::new();
        let mut chunks = 0;
        loop {
            let offset_before = output.len() as u64;
            let chunk = line_reader.next_chunk()?;
            if chunk.is_empty() {
                break;
            }
            assert_eq!(chunk.last(), Some(&b'\n'));
            output.extend_from_slice(chunk);
            assert_eq!(line_reader.offset(), offset_before);
            chunks += 1;
        }
        Ok((output, chunks))
    }

    #[test]
    fn test_empty_input() -> Result<(), anyhow::Error> {
        let (output, chunks) = read_all(b"", 16)?;
        assert!(output.is_empty());
        assert_eq!(chunks, 0);
        Ok(())
    }

    #[test]
    fn test_buffer_greater_than_input() -> Result<(), anyhow::Error> {
        let input = b"Smith. NY03\nAdams. CA01\n";
        let (output, chunks) = read_all(input, 1024)?;
        assert_eq!(output, input.to_vec());
        assert_eq!(chunks, 1);
        Ok(())
    }

    #[test]
    fn test_input_exact_multiple_of_buffer() -> Result<(), anyhow::Error> {
        // every line is 12 bytes
        let input = b"Smith. NY03\nAdams. CA01\nJones. TX02\nBrown. WA04\n";
        let (output, chunks) = read_all(input, 24)?;
        assert_eq!(output, input.to_vec());
        assert_eq!(chunks, 2);
        Ok(())
    }

    #[test]
    fn test_line_straddles_buffer_boundaries() -> Result<(), anyhow::Error> {
        let input = b"A. x01\nA much longer key. tail1234502\nB. y03\n";
        for capacity in 31..64 {
            let (output, _chunks) = read_all(input, capacity)?;
            assert_eq!(output, input.to_vec(), "capacity: {}", capacity);
        }
        Ok(())
    }

    #[test]
    fn test_no_lines_lost() -> Result<(), anyhow::Error> {
        let mut input = Vec::new();
        for i in 0..1000 {
            writeln!(input, "Key number {}. t{}{:02}", i % 37, i % 1000, i % 100)?;
        }
        let (output, chunks) = read_all(&input, 100)?;
        assert_eq!(output, input);
        assert!(chunks > 1);
        assert_eq!(count_lines(Cursor::new(&output), 7)?, 1000);
        Ok(())
    }

    #[test]
    fn test_line_longer_than_buffer() {
        let input = b"A key that does not fit. NY01\n";
        assert!(read_all(input, 8).is_err());
    }

    #[test]
    fn test_unterminated_last_line() {
        let input = b"Smith. NY03\nAdams. CA01";
        assert!(read_all(input, 1024).is_err());
        assert!(read_all(input, 12).is_err());
    }

    #[test]
    fn test_zero_capacity() {
        assert!(LineReader::new(Cursor::new(Vec::new()), 0).is_err());
    }

    #[test]
    fn test_open_file() -> Result<(), anyhow::Error> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"Smith. NY03\nAdams. CA01\n")?;
        file.flush()?;
        let mut line_reader = LineReader::open(&file.path().to_path_buf(), 16)?;
        assert_eq!(line_reader.capacity(), 16);
        assert_eq!(line_reader.next_chunk()?, b"Smith. NY03\n");
        assert_eq!(line_reader.next_chunk()?, b"Adams. CA01\n");
        assert!(line_reader.next_chunk()?.is_empty());
        assert!(LineReader::open(&PathBuf::from("./target/does-not-exist.dat"), 16).is_err());
        Ok(())
    }
}
