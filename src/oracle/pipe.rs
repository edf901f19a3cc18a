// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Oracle process reached through a pair of named pipes.
//!
//! Wire format, one line each way:
//!
//! ```text
//! -> M <n> <pattern name 1> <target name 1> ... <pattern name n> <target name n>
//! <- Y | yes | accept | N | no | reject      (case-insensitive first token)
//! ```
//!
//! Anything else, end of file, or an I/O error is an
//! [`SolveError::OracleCommunication`]. Workers share one channel; the round trip
//! is serialized by a mutex.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, trace};

use super::{MatchOracle, OracleVerdict};
use crate::bigraph::Bigraph;
use crate::errors::SolveError;

struct Channel<W, R> {
    writer: W,
    reader: R,
    line: String,
}

pub struct NamedPipeOracle<W, R> {
    pattern_names: Vec<String>,
    target_names: Vec<String>,
    channel: Mutex<Channel<W, R>>,
}

impl NamedPipeOracle<File, BufReader<File>> {
    /// Open the send pipe for writing, then the receive pipe for reading.
    ///
    /// Opening a FIFO blocks until the other side opens it too.
    pub fn open(send: &Path, receive: &Path, pattern: &Bigraph, target: &Bigraph) -> Result<Self, SolveError> {
        let writer = OpenOptions::new()
            .append(true)
            .create(true)
            .open(send)
            .map_err(|e| SolveError::oracle(format!("cannot open {}", send.display()), Some(e)))?;
        let reader = File::open(receive)
            .map_err(|e| SolveError::oracle(format!("cannot open {}", receive.display()), Some(e)))?;
        debug!(send = %send.display(), receive = %receive.display(), "oracle pipes open");
        Ok(Self::new(writer, BufReader::new(reader), pattern, target))
    }
}

impl<W: Write + Send, R: BufRead + Send> NamedPipeOracle<W, R> {
    pub fn new(writer: W, reader: R, pattern: &Bigraph, target: &Bigraph) -> Self {
        Self {
            pattern_names: (0..pattern.len()).map(|v| pattern.name(v).to_string()).collect(),
            target_names: (0..target.len()).map(|v| target.name(v).to_string()).collect(),
            channel: Mutex::new(Channel {
                writer,
                reader,
                line: String::new(),
            }),
        }
    }

    /// The request line for `mapping`, without the newline.
    pub fn encode(&self, mapping: &[(usize, usize)]) -> String {
        let mut line = format!("M {}", mapping.len());
        for &(p, t) in mapping {
            line.push(' ');
            line.push_str(&self.pattern_names[p]);
            line.push(' ');
            line.push_str(&self.target_names[t]);
        }
        line
    }

    pub fn into_inner(self) -> Result<(W, R), SolveError> {
        let channel = self
            .channel
            .into_inner()
            .map_err(|_| SolveError::oracle("oracle channel poisoned", None))?;
        Ok((channel.writer, channel.reader))
    }
}

impl<W: Write + Send, R: BufRead + Send> MatchOracle for NamedPipeOracle<W, R> {
    fn ask(&self, mapping: &[(usize, usize)]) -> Result<OracleVerdict, SolveError> {
        let request = self.encode(mapping);
        let mut channel = self
            .channel
            .lock()
            .map_err(|_| SolveError::oracle("oracle channel poisoned", None))?;
        let Channel { writer, reader, line } = &mut *channel;

        writeln!(writer, "{}", request)
            .and_then(|_| writer.flush())
            .map_err(|e| SolveError::oracle("cannot send candidate mapping", Some(e)))?;

        line.clear();
        let read = reader
            .read_line(line)
            .map_err(|e| SolveError::oracle("cannot read oracle response", Some(e)))?;
        if read == 0 {
            return Err(SolveError::oracle("oracle closed its pipe", None));
        }
        let verdict = parse_verdict(line)?;
        trace!(?verdict, "oracle answered");
        Ok(verdict)
    }
}

/// Interpret one response line.
pub fn parse_verdict(line: &str) -> Result<OracleVerdict, SolveError> {
    let token = line.split_whitespace().next().unwrap_or("");
    match token.to_ascii_lowercase().as_str() {
        "y" | "yes" | "accept" => Ok(OracleVerdict::Accept),
        "n" | "no" | "reject" => Ok(OracleVerdict::Reject),
        _ => Err(SolveError::oracle(
            format!("unrecognised response '{}'", line.trim_end()),
            None,
        )),
    }
}
