// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Read length histogram and read count of a FASTQ scan.

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadLengthHistogram {
    counts: BTreeMap<u64, u64>,
    read_count: u64,
}

impl ReadLengthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one sequence line. Trailing whitespace, including the line
    /// terminator, is not part of the read.
    pub fn observe(&mut self, seq_line: &[u8]) {
        let len = seq_line.trim_ascii_end().len() as u64;
        *self.counts.entry(len).or_insert(0) += 1;
        self.read_count += 1;
    }

    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    pub fn count(&self, length: u64) -> u64 {
        self.counts.get(&length).copied().unwrap_or(0)
    }

    /// Observed lengths in ascending order.
    pub fn lengths(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.keys().copied()
    }

    /// `(length, reads)` pairs in ascending length order.
    pub fn buckets(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.counts.iter().map(|(&len, &n)| (len, n))
    }

    /// Number of reads whose length is within `tolerance` of `length`.
    pub fn reads_within(&self, length: u64, tolerance: u64) -> u64 {
        self.counts
            .range(length.saturating_sub(tolerance)..=length.saturating_add(tolerance))
            .map(|(_, n)| n)
            .sum()
    }
}
