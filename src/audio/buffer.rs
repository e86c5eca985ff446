/// Per-session accumulator of not-yet-processed compressed audio bytes.
///
/// Chunks are appended as they arrive from the client. When a processing
/// job is submitted the current contents are snapshotted and the buffer is
/// left intact; the job's completion decides how much of the prefix was
/// consumed. Bytes appended while a job is running are therefore preserved
/// for the next round, never lost and never double-processed.
#[derive(Debug, Default)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a chunk of compressed audio.
    pub fn append(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy of the current contents, for handing to a processing job.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Drop the first `n` bytes (the prefix a completed job consumed).
    /// Bytes appended after the job was submitted stay in place.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.bytes.len());
        self.bytes.drain(..n);
    }

    /// Take the full contents and leave the buffer empty.
    pub fn drain_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_monotonically() {
        let mut buf = AudioBuffer::new();
        assert!(buf.is_empty());

        buf.append(&[1, 2, 3]);
        buf.append(&[4, 5]);
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.snapshot(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn consume_drops_prefix_only() {
        let mut buf = AudioBuffer::new();
        buf.append(&[1, 2, 3, 4]);

        // Simulate a job submitted over the first 4 bytes while 2 more arrive.
        let submitted = buf.len();
        buf.append(&[5, 6]);

        buf.consume(submitted);
        assert_eq!(buf.snapshot(), vec![5, 6]);
    }

    #[test]
    fn consume_past_end_is_clamped() {
        let mut buf = AudioBuffer::new();
        buf.append(&[1, 2]);
        buf.consume(10);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_all_empties_exactly_once() {
        let mut buf = AudioBuffer::new();
        buf.append(&[9, 8, 7]);

        let drained = buf.drain_all();
        assert_eq!(drained, vec![9, 8, 7]);
        assert!(buf.is_empty());
        assert!(buf.drain_all().is_empty());
    }
}
