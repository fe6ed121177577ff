// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Thresholds used when resolving the published signature of a file.

use anyhow::Result;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::utils;

/// Policy constants of the signature resolver. Missing fields in a
/// configuration file take their default values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SignatureParams {
    /// Files with more distinct barcode signatures than this are treated as
    /// heavily multiplexed lane pools.
    pub multiplexed_signature_threshold: usize,
    /// A barcode is dominant when `group_total / barcode_count` is below this ratio.
    pub barcode_dominance_ratio: f64,
    /// Reads within this many bases of the declared read length are in tolerance.
    pub read_length_tolerance: u64,
    /// Minimum fraction of reads that must be within tolerance.
    pub read_length_min_fraction: f64,
    /// Declared read lengths at or below this value count as undeclared.
    pub min_declared_read_length: u64,
}

impl Default for SignatureParams {
    fn default() -> Self {
        SignatureParams {
            multiplexed_signature_threshold: 100,
            barcode_dominance_ratio: 100.0,
            read_length_tolerance: 2,
            read_length_min_fraction: 0.95,
            min_declared_read_length: 2,
        }
    }
}

impl SignatureParams {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<SignatureParams> {
        utils::read_json(path)
    }
}
