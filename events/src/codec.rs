//! NDJSON event-log reader.
//!
//! The captured chain log is one JSON `EventRecord` per line, already in
//! chain order. The reader is an iterator so replay never has to hold the
//! full log in memory.

use crate::event::EventRecord;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("i/o error reading event log: {0}")]
    Io(#[from] io::Error),

    #[error("malformed event record on line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

/// Streaming reader over an NDJSON event log.
pub struct EventLogReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> EventLogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventLogReader<R> {
    type Item = Result<EventRecord, EventLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&line).map_err(|source| EventLogError::Malformed {
                    line: self.line_no,
                    source,
                }),
            );
        }
    }
}
