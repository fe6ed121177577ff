// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Stream a decompressed FASTQ file through the signature engine, one line at
//! a time. The first line of every 4-line record is a read name, the second
//! the sequence.

use log::warn;
use std::io::BufRead;

use crate::errors::ErrorKey;
use crate::metadata::ReadNameDetails;
use crate::state::RunSignatureState;

/// Feeds FASTQ lines to a [`RunSignatureState`].
#[derive(Debug, Default)]
pub struct LineScanner {
    state: RunSignatureState,
    layout: Option<ReadNameDetails>,
    line_index: u64,
}

impl LineScanner {
    /// `layout` overrides read-name classification when the submitter
    /// declared the positions of the signature fields.
    pub fn new(layout: Option<ReadNameDetails>) -> LineScanner {
        LineScanner {
            state: RunSignatureState::new(),
            layout,
            line_index: 0,
        }
    }

    /// Process the next line of the file, terminator included or not.
    pub fn push_line(&mut self, line: &[u8]) {
        match self.line_index % 4 {
            0 => match std::str::from_utf8(line) {
                Ok(name) => self.state.process_read_name(name, self.layout.as_ref()),
                Err(_) => self.state.errors.record(
                    ErrorKey::ReadnameEncoding,
                    "Error occured, while decoding the readname string.",
                ),
            },
            1 => self.state.process_sequence(line),
            _ => (),
        }
        self.line_index += 1;
    }

    /// Record a failure of the underlying stream. Lines pushed so far are kept.
    pub fn stream_failed(&mut self, err: &std::io::Error) {
        warn!("error streaming fastq after {} lines: {}", self.line_index, err);
        self.state.errors.record(
            ErrorKey::UnzippedFastqStreaming,
            "Error occured, while streaming unzipped fastq.",
        );
    }

    pub fn lines(&self) -> u64 {
        self.line_index
    }

    pub fn finish(self) -> RunSignatureState {
        self.state
    }
}

/// Scan every line of `reader`. A read error ends the scan and the state
/// collected up to that point is returned.
pub fn scan_fastq<R: BufRead>(mut reader: R, layout: Option<ReadNameDetails>) -> RunSignatureState {
    let mut scanner = LineScanner::new(layout);
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => scanner.push_line(&buf),
            Err(e) => {
                scanner.stream_failed(&e);
                break;
            }
        }
    }
    scanner.finish()
}
