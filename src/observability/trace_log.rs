//! Trace access-log sink.
//!
//! One line per completed request, written off the request path through a
//! `tracing_appender` non-blocking worker. A sink that cannot be opened falls
//! back to stderr; a write that fails is dropped. Tracing never fails the
//! request it observes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Timestamp prefix, UTC.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Clone)]
enum Sink {
    /// Background writer; the guard flushes pending lines when the last clone drops.
    Writer {
        writer: NonBlocking,
        _guard: Arc<WorkerGuard>,
    },
    Memory(Arc<Mutex<Vec<String>>>),
    Disabled,
}

/// Destination for trace access-log lines.
#[derive(Clone)]
pub struct TraceLog {
    sink: Sink,
}

impl TraceLog {
    /// Open the trace log at `path`, or stderr when no path is configured.
    ///
    /// A file that cannot be opened is reported and replaced by stderr.
    pub fn open(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::stderr();
        };

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                tracing::info!(path = %path.display(), "Trace log opened");
                Self {
                    sink: Sink::Writer {
                        writer,
                        _guard: Arc::new(guard),
                    },
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to open trace log, falling back to stderr"
                );
                Self::stderr()
            }
        }
    }

    /// Non-blocking stderr sink.
    pub fn stderr() -> Self {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        Self {
            sink: Sink::Writer {
                writer,
                _guard: Arc::new(guard),
            },
        }
    }

    /// Sink that keeps lines in memory, returned alongside a handle to read them.
    pub fn memory() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sink: Sink::Memory(lines.clone()),
            },
            lines,
        )
    }

    /// Sink that discards every line.
    pub fn disabled() -> Self {
        Self {
            sink: Sink::Disabled,
        }
    }

    /// Write one line, prefixed with the current UTC timestamp.
    pub fn write_line(&self, message: &str) {
        let line = format!(
            "{} {}",
            chrono::Utc::now().format(TIMESTAMP_FORMAT),
            message
        );

        match &self.sink {
            Sink::Writer { writer, .. } => {
                // One write per line: each write is a separate message to the worker.
                let mut writer = writer.clone();
                let mut bytes = line.into_bytes();
                bytes.push(b'\n');
                if let Err(e) = writer.write_all(&bytes) {
                    tracing::debug!(error = %e, "Dropped trace log line");
                }
            }
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
            Sink::Disabled => {}
        }
    }
}

impl std::fmt::Debug for TraceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.sink {
            Sink::Writer { .. } => "writer",
            Sink::Memory(_) => "memory",
            Sink::Disabled => "disabled",
        };
        f.debug_struct("TraceLog").field("sink", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_prefixes_timestamp() {
        let (log, lines) = TraceLog::memory();
        log.write_line("TraceID: abc");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        // "YYYY/MM/DD HH:MM:SS " is 20 characters.
        assert_eq!(&lines[0][20..], "TraceID: abc");
        assert_eq!(&lines[0][4..5], "/");
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        std::fs::write(&path, "existing\n").unwrap();

        let log = TraceLog::open(Some(&path));
        log.write_line("first");
        log.write_line("second");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing");
        assert!(lines[1].ends_with(" first"));
        assert!(lines[2].ends_with(" second"));
    }

    #[test]
    fn test_concurrent_writers_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let log = TraceLog::open(Some(&path));
        let threads = 8;
        let per_thread = 1000;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let log = log.clone();
                scope.spawn(move || {
                    for i in 0..per_thread {
                        log.write_line(&format!("BEGIN t={t} i={i} {} END", "x".repeat(64)));
                    }
                });
            }
        });
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), threads * per_thread);
        for line in lines {
            assert_eq!(line.matches("BEGIN").count(), 1, "merged line: {line}");
            assert!(line[20..].starts_with("BEGIN t="), "malformed line: {line}");
            assert!(line.ends_with(" END"), "malformed line: {line}");
        }
    }

    #[test]
    fn test_unopenable_path_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("trace.log");

        let log = TraceLog::open(Some(&path));
        assert_eq!(format!("{log:?}"), "TraceLog { sink: \"writer\" }");
        log.write_line("still fine");
        assert!(!path.exists());
    }

    #[test]
    fn test_disabled_sink_is_noop() {
        TraceLog::disabled().write_line("ignored");
    }
}
