//! Receive framer
//!
//! Turns the raw byte stream of the receive pipe into newline-delimited
//! messages without ever blocking the calling thread.
//!
//! # Buffer
//!
//! [`RxBuffer`] is a fixed-capacity byte buffer with a fill count. Bytes in
//! `[0, filled)` are pending data; nothing outside that range is ever read.
//!
//! # Polling
//!
//! [`ReceiveFramer::poll`] performs one step of a receive request:
//!
//! 1. With no pipe attached the step is [`FramerStep::Closed`].
//! 2. Unless the buffer already holds a complete line at or above the drain
//!    threshold (or is completely full), one non-blocking read appends to it.
//! 3. The first complete line is removed and delivered. If there is none, a
//!    full buffer drops its oldest byte and the caller is told to retry.
//!
//! A read error ends the request with [`FramerStep::Fault`]; end of stream
//! and "would block" on an empty buffer ask for a retry.

use super::pipe::{open_path, PipeMode};
use crate::config::FramerConfig;
use crate::error::Result;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Outcome of a single non-blocking read
#[derive(Debug)]
pub enum ReadOutcome {
    /// `n > 0` bytes were read
    Data(usize),
    /// Nothing available right now
    WouldBlock,
    /// Zero bytes: no writer is attached at the moment
    EndOfStream,
    /// Any other I/O error
    Fault(io::Error),
}

impl From<io::Result<usize>> for ReadOutcome {
    fn from(result: io::Result<usize>) -> Self {
        match result {
            Ok(0) => ReadOutcome::EndOfStream,
            Ok(n) => ReadOutcome::Data(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => ReadOutcome::WouldBlock,
            Err(e) => ReadOutcome::Fault(e),
        }
    }
}

/// Non-blocking byte source behind the framer
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes without blocking
    fn read_into(&mut self, buf: &mut [u8]) -> ReadOutcome;
}

impl ByteSource for File {
    fn read_into(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.read(buf).into()
    }
}

/// Short error code reported in `Rx Message Error` faults
pub fn error_code(err: &io::Error) -> String {
    let Some(errno) = err.raw_os_error() else {
        return format!("{:?}", err.kind());
    };
    let name = match errno {
        libc::EIO => "EIO",
        libc::EBADF => "EBADF",
        libc::EINVAL => "EINVAL",
        libc::EINTR => "EINTR",
        libc::ENXIO => "ENXIO",
        libc::EPIPE => "EPIPE",
        libc::EISDIR => "EISDIR",
        libc::EFAULT => "EFAULT",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::ENOENT => "ENOENT",
        libc::ETIMEDOUT => "ETIMEDOUT",
        _ => return format!("os error {}", errno),
    };
    name.to_string()
}

// ==================== Buffer ====================

/// Fixed-capacity receive buffer
#[derive(Debug, Clone)]
pub struct RxBuffer {
    data: Box<[u8]>,
    filled: usize,
}

impl RxBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.data.len()
    }

    /// Pending bytes
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Unused tail available for the next read
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.filled..]
    }

    /// Account for `n` bytes written into [`spare_mut`](Self::spare_mut)
    pub fn commit(&mut self, n: usize) {
        self.filled = (self.filled + n).min(self.data.len());
    }

    /// Copy bytes in, as far as they fit. Returns the number copied.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> usize {
        let spare = self.spare_mut();
        let n = bytes.len().min(spare.len());
        spare[..n].copy_from_slice(&bytes[..n]);
        self.commit(n);
        n
    }

    pub fn has_line(&self) -> bool {
        self.pending().contains(&b'\n')
    }

    /// Remove and decode the first complete line, without its terminator
    pub fn take_line(&mut self) -> Option<String> {
        let end = self.pending().iter().position(|&b| b == b'\n')?;
        let message = String::from_utf8_lossy(&self.data[..end]).into_owned();

        let consumed = end + 1;
        self.data.copy_within(consumed..self.filled, 0);
        self.filled -= consumed;
        Some(message)
    }

    /// Drop the oldest pending byte
    pub fn evict_oldest(&mut self) {
        if self.filled > 0 {
            self.data.copy_within(1..self.filled, 0);
            self.filled -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.filled = 0;
    }
}

// ==================== Framer ====================

/// Result of one receive step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramerStep {
    /// A complete message
    Delivered(String),
    /// Nothing complete yet; try again after the retry delay
    Retry,
    /// No receive pipe is open
    Closed,
    /// The read failed with this error code
    Fault(String),
}

/// Bounded, non-blocking line reader over a [`ByteSource`]
pub struct ReceiveFramer {
    buffer: RxBuffer,
    threshold: usize,
    source: Option<Box<dyn ByteSource>>,
}

impl ReceiveFramer {
    pub fn new(config: &FramerConfig) -> Self {
        Self {
            buffer: RxBuffer::new(config.capacity),
            threshold: config.threshold,
            source: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn buffer(&self) -> &RxBuffer {
        &self.buffer
    }

    /// Open the receive pipe non-blocking unless a source is already attached
    pub fn open(&mut self, path: &Path) -> Result<()> {
        if self.source.is_none() {
            let file = open_path(path, PipeMode::NonBlockingRead)?;
            tracing::debug!("Receive pipe {:?} open", path);
            self.source = Some(Box::new(file));
        }
        Ok(())
    }

    /// Attach an arbitrary byte source, replacing any current one
    pub fn attach(&mut self, source: Box<dyn ByteSource>) {
        self.source = Some(source);
    }

    /// Drop the source and discard buffered bytes
    pub fn close(&mut self) -> bool {
        self.buffer.clear();
        self.source.take().is_some()
    }

    /// Run one step of a receive request
    pub fn poll(&mut self) -> FramerStep {
        let Some(source) = self.source.as_mut() else {
            return FramerStep::Closed;
        };

        let skip_read = self.buffer.is_full()
            || (self.buffer.filled() >= self.threshold && self.buffer.has_line());

        if !skip_read {
            match source.read_into(self.buffer.spare_mut()) {
                ReadOutcome::Data(n) => {
                    self.buffer.commit(n);
                    tracing::trace!("Read {} bytes, {} pending", n, self.buffer.filled());
                }
                ReadOutcome::EndOfStream => return FramerStep::Retry,
                ReadOutcome::WouldBlock if self.buffer.filled() == 0 => {
                    return FramerStep::Retry;
                }
                ReadOutcome::WouldBlock => {}
                ReadOutcome::Fault(e) => {
                    let code = error_code(&e);
                    tracing::debug!("Receive read failed: {} ({})", e, code);
                    return FramerStep::Fault(code);
                }
            }
        }

        self.drain()
    }

    fn drain(&mut self) -> FramerStep {
        if let Some(message) = self.buffer.take_line() {
            tracing::debug!("<- {:?}", message);
            return FramerStep::Delivered(message);
        }
        if self.buffer.is_full() {
            self.buffer.evict_oldest();
        }
        FramerStep::Retry
    }
}

impl std::fmt::Debug for ReceiveFramer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiveFramer")
            .field("buffer", &self.buffer)
            .field("threshold", &self.threshold)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn config(capacity: usize, threshold: usize) -> FramerConfig {
        FramerConfig {
            capacity,
            threshold,
            ..Default::default()
        }
    }

    fn feeding(bytes: &'static [u8]) -> impl FnMut(&mut [u8]) -> ReadOutcome {
        move |buf| {
            let n = bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&bytes[..n]);
            ReadOutcome::Data(n)
        }
    }

    #[test]
    fn test_take_line_leaves_remainder() {
        let mut buffer = RxBuffer::new(16);
        buffer.extend_from_slice(b"abc\ndef");
        assert_eq!(buffer.filled(), 7);

        assert_eq!(buffer.take_line().as_deref(), Some("abc"));
        assert_eq!(buffer.filled(), 3);
        assert_eq!(buffer.pending(), b"def");
        assert_eq!(buffer.take_line(), None);
    }

    #[test]
    fn test_take_line_at_end_empties_buffer() {
        let mut buffer = RxBuffer::new(8);
        buffer.extend_from_slice(b"ping\n");
        assert_eq!(buffer.take_line().as_deref(), Some("ping"));
        assert_eq!(buffer.filled(), 0);
    }

    #[test]
    fn test_take_line_is_lossy() {
        let mut buffer = RxBuffer::new(8);
        buffer.extend_from_slice(&[b'o', 0xFF, b'k', b'\n']);
        assert_eq!(buffer.take_line().unwrap(), "o\u{FFFD}k");
    }

    #[test]
    fn test_extend_never_exceeds_capacity() {
        let mut buffer = RxBuffer::new(4);
        assert_eq!(buffer.extend_from_slice(b"abcdef"), 4);
        assert!(buffer.is_full());
        buffer.evict_oldest();
        assert_eq!(buffer.pending(), b"bcd");
    }

    #[test]
    fn test_closed_framer() {
        let mut framer = ReceiveFramer::new(&FramerConfig::default());
        assert_eq!(framer.poll(), FramerStep::Closed);
    }

    #[test]
    fn test_split_message_then_retry() {
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .returning(feeding(b"abc\ndef"));

        let mut framer = ReceiveFramer::new(&config(16, 12));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Delivered("abc".into()));
        assert_eq!(framer.buffer().pending(), b"def");
    }

    #[test]
    fn test_would_block_with_pending_bytes_drains() {
        let mut seq = Sequence::new();
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .in_sequence(&mut seq)
            .returning(feeding(b"one\ntwo\n"));
        source
            .expect_read_into()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ReadOutcome::WouldBlock);

        let mut framer = ReceiveFramer::new(&config(64, 48));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Delivered("one".into()));
        assert_eq!(framer.poll(), FramerStep::Delivered("two".into()));
    }

    #[test]
    fn test_empty_reads_request_retry() {
        let mut seq = Sequence::new();
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ReadOutcome::WouldBlock);
        source
            .expect_read_into()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ReadOutcome::EndOfStream);

        let mut framer = ReceiveFramer::new(&config(64, 48));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Retry);
        assert_eq!(framer.poll(), FramerStep::Retry);
    }

    #[test]
    fn test_partial_line_requests_retry() {
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .returning(feeding(b"partial"));

        let mut framer = ReceiveFramer::new(&config(64, 48));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Retry);
        assert_eq!(framer.buffer().filled(), 7);
    }

    #[test]
    fn test_read_fault_reports_code() {
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .returning(|_| ReadOutcome::Fault(io::Error::from_raw_os_error(libc::EIO)));

        let mut framer = ReceiveFramer::new(&config(64, 48));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Fault("EIO".into()));
        assert!(framer.is_open());
    }

    #[test]
    fn test_threshold_skips_read_when_line_buffered() {
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .returning(feeding(b"aaaaaaa\nbbbbbbb\ncc"));

        let mut framer = ReceiveFramer::new(&config(32, 8));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Delivered("aaaaaaa".into()));
        // 10 bytes left with a complete line: no second read is expected
        assert_eq!(framer.poll(), FramerStep::Delivered("bbbbbbb".into()));
        assert_eq!(framer.buffer().pending(), b"cc");
    }

    #[test]
    fn test_full_buffer_without_terminator_evicts_one_byte_per_pass() {
        let mut source = MockByteSource::new();
        source
            .expect_read_into()
            .times(1)
            .returning(feeding(b"abcdefgh"));

        let mut framer = ReceiveFramer::new(&config(8, 4));
        framer.attach(Box::new(source));

        assert_eq!(framer.poll(), FramerStep::Retry);
        assert_eq!(framer.buffer().pending(), b"bcdefgh");

        let mut full = ReceiveFramer::new(&config(4, 2));
        let mut always = MockByteSource::new();
        always.expect_read_into().returning(feeding(b"xxxx"));
        full.attach(Box::new(always));
        for _ in 0..10 {
            assert_eq!(full.poll(), FramerStep::Retry);
            assert!(full.buffer().filled() <= 4);
        }
    }

    #[test]
    fn test_close_discards_buffer() {
        let mut source = MockByteSource::new();
        source.expect_read_into().returning(feeding(b"half"));

        let mut framer = ReceiveFramer::new(&config(16, 8));
        framer.attach(Box::new(source));
        framer.poll();
        assert!(framer.close());
        assert_eq!(framer.buffer().filled(), 0);
        assert!(!framer.close());
        assert_eq!(framer.poll(), FramerStep::Closed);
    }

    #[test]
    fn test_read_outcome_from_io_result() {
        assert!(matches!(ReadOutcome::from(Ok(0)), ReadOutcome::EndOfStream));
        assert!(matches!(ReadOutcome::from(Ok(3)), ReadOutcome::Data(3)));
        assert!(matches!(
            ReadOutcome::from(Err(io::Error::from(io::ErrorKind::WouldBlock))),
            ReadOutcome::WouldBlock
        ));
        assert!(matches!(
            ReadOutcome::from(Err(io::Error::from_raw_os_error(libc::EBADF))),
            ReadOutcome::Fault(_)
        ));
    }

    #[test]
    fn test_error_code_names() {
        assert_eq!(error_code(&io::Error::from_raw_os_error(libc::EBADF)), "EBADF");
        assert_eq!(error_code(&io::Error::from_raw_os_error(9999)), "os error 9999");
        assert_eq!(
            error_code(&io::Error::from(io::ErrorKind::UnexpectedEof)),
            "UnexpectedEof"
        );
    }
}
