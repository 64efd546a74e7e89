use std::io::Write;

use anyhow::{anyhow, Context};

/// Batches output bytes in a fixed capacity buffer.
///
/// The buffer is flushed to the sink when the next payload does not fit. A payload larger than
/// the capacity is rejected. Bytes still buffered when the writer is dropped are flushed,
/// [BufferedWriter::finish] flushes and reports the outcome.
pub struct BufferedWriter<W: Write> {
    // None only after finish
    sink: Option<W>,
    buffer: Vec<u8>,
    capacity: usize,
    written: u64,
}

impl<W: Write> BufferedWriter<W> {
    pub fn new(sink: W, capacity: usize) -> Result<BufferedWriter<W>, anyhow::Error> {
        if capacity == 0 {
            return Err(anyhow!("Write buffer capacity must be greater than zero"));
        }
        Ok(
            BufferedWriter {
                sink: Some(sink),
                buffer: Vec::with_capacity(capacity),
                capacity,
                written: 0,
            }
        )
    }

    pub fn append(&mut self, data: &[u8]) -> Result<(), anyhow::Error> {
        if data.len() > self.capacity {
            return Err(
                anyhow!(
                    "Payload of {} bytes exceeds the write buffer capacity of {} bytes",
                    data.len(),
                    self.capacity
                )
            );
        }
        if data.len() > self.remaining() {
            self.flush()?;
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Write the buffered bytes to the sink
    pub fn flush(&mut self) -> Result<(), anyhow::Error> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let sink = self.sink.as_mut()
            .ok_or_else(|| anyhow!("Writer is already finished"))?;
        sink.write_all(&self.buffer)
            .with_context(|| anyhow!("Failed to write {} bytes at offset {}", self.buffer.len(), self.written))?;
        self.written += self.buffer.len() as u64;
        self.buffer.clear();
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes written to the sink so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush everything, including the sink itself, and return the sink
    pub fn finish(mut self) -> Result<W, anyhow::Error> {
        self.flush()?;
        let mut sink = self.sink.take()
            .ok_or_else(|| anyhow!("Writer is already finished"))?;
        sink.flush()
            .with_context(|| "Failed to flush the output")?;
        log::info!("Total bytes written: {}", self.written);
        Ok(sink)
    }
}

impl<W: Write> Drop for BufferedWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            if let Err(e) = self.flush() {
                log::error!("Failed to flush buffered output on drop: {:#}", e);
            }
        }
    }
}
