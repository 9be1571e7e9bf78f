// src/exec/drainer.rs

//! Non-blocking extraction of complete output lines from a child pipe.
//!
//! A dedicated reader task owns the blocking read: it converts the pipe
//! into complete lines (`BufReader::lines`) and forwards them over an
//! unbounded channel. OS pipe buffers are therefore drained promptly even
//! when nobody is polling, and a poll tick can never stall on stream I/O —
//! [`StreamDrainer::drain`] only ever pops what the reader has already
//! queued.
//!
//! Partial-line policy: a line without a trailing newline is held by the
//! reader until the newline arrives, except at EOF, where the trailing
//! bytes are delivered as a final line. The flush-on-exit pass thus
//! observes an unterminated last line instead of losing it.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::types::StreamSource;

/// One message from the reader task.
enum StreamItem {
    Line(String),
    /// The reader hit an unrecognized I/O failure and stopped.
    Failed(io::Error),
}

/// Result of one drain pass.
#[derive(Debug, Default)]
pub struct Drained {
    /// Complete lines that were immediately available, in order.
    pub lines: Vec<String>,
    /// Set when the reader task reported an I/O failure. Reported once;
    /// subsequent drains on the same drainer return empty results.
    pub failure: Option<io::Error>,
}

impl Drained {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.failure.is_none()
    }
}

/// Owns the reader task and receiving end for one child pipe.
pub struct StreamDrainer {
    source: StreamSource,
    rx: mpsc::UnboundedReceiver<StreamItem>,
    reader: Option<JoinHandle<()>>,
    closed: bool,
}

impl StreamDrainer {
    /// Attach a drainer to a pipe, spawning its reader task.
    pub fn new<R>(source: StreamSource, stream: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(StreamItem::Line(line)).is_err() {
                            // Receiver dropped; nobody wants the output.
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        let _ = tx.send(StreamItem::Failed(err));
                        break;
                    }
                }
            }
        });

        Self {
            source,
            rx,
            reader: Some(reader),
            closed: false,
        }
    }

    /// Pop every line currently available, without blocking.
    ///
    /// Returns an empty result when nothing is queued. A stream that closed
    /// mid-drain is not an error: the drain stops and returns whatever was
    /// collected before closure.
    pub fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();
        loop {
            match self.rx.try_recv() {
                Ok(StreamItem::Line(line)) => drained.lines.push(line),
                Ok(StreamItem::Failed(err)) => {
                    drained.failure = Some(err);
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    trace!(source = %self.source, "stream closed during drain");
                    break;
                }
            }
        }
        drained
    }

    /// Final drain on the exit path: wait (bounded) for the reader task to
    /// reach EOF, then pop everything it queued.
    ///
    /// After a process exits, its side of the pipe closes and the reader
    /// task finishes as soon as it has pushed the remaining buffered lines,
    /// so the bound is a formality — it only bites if something else
    /// (e.g. an orphaned grandchild) is holding the pipe open.
    pub async fn flush(&mut self) -> Drained {
        if let Some(reader) = self.reader.take() {
            let waited =
                tokio::time::timeout(std::time::Duration::from_millis(250), reader).await;
            if let Err(_elapsed) = waited {
                debug!(
                    source = %self.source,
                    "reader did not reach EOF in time; flushing what is queued"
                );
            }
        }
        self.drain()
    }

    /// Release the reader task and stop consuming the pipe.
    ///
    /// Returns `true` if this call actually closed the drainer, `false` if
    /// it was already closed — the double-close guard.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.rx.close();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for StreamDrainer {
    fn drop(&mut self) {
        // Not the cleanup mechanism (stop()/check() close explicitly on the
        // Exited path); this only stops a leaked reader task.
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drainer_from_bytes(bytes: &'static [u8]) -> StreamDrainer {
        StreamDrainer::new(StreamSource::Stdout, bytes)
    }

    async fn settle() {
        // Let the reader task run to EOF.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn drains_available_lines_in_order() {
        let mut drainer = drainer_from_bytes(b"one\ntwo\nthree\n");
        settle().await;

        let drained = drainer.drain();
        assert_eq!(drained.lines, vec!["one", "two", "three"]);
        assert!(drained.failure.is_none());
    }

    #[tokio::test]
    async fn idle_stream_drains_empty_without_blocking() {
        let mut drainer = drainer_from_bytes(b"");
        settle().await;

        let drained = drainer.drain();
        assert!(drained.lines.is_empty());
        assert!(drained.failure.is_none());

        // Draining again after closure is still a non-event.
        let drained = drainer.drain();
        assert!(drained.is_empty());
    }

    #[tokio::test]
    async fn trailing_partial_line_is_delivered_at_eof() {
        let mut drainer = drainer_from_bytes(b"done\nno newline here");
        let drained = drainer.flush().await;
        assert_eq!(drained.lines, vec!["done", "no newline here"]);
    }

    #[tokio::test]
    async fn close_is_guarded_against_double_close() {
        let mut drainer = drainer_from_bytes(b"x\n");
        assert!(!drainer.is_closed());
        assert!(drainer.close());
        assert!(drainer.is_closed());
        assert!(!drainer.close());
    }

    #[tokio::test]
    async fn flush_after_slow_producer_collects_everything() {
        let (client, mut server) = tokio::io::duplex(256);
        let mut drainer = StreamDrainer::new(StreamSource::Stderr, client);

        use tokio::io::AsyncWriteExt;
        server.write_all(b"a\nb\n").await.unwrap();
        drop(server);

        let drained = drainer.flush().await;
        assert_eq!(drained.lines, vec!["a", "b"]);
    }
}
