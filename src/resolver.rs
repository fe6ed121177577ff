// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Decide which signature set a scanned FASTQ file publishes, and flag
//! inconsistencies between its content and its metadata.

use itertools::Itertools;
use log::debug;
use serde_derive::Serialize;
use std::collections::BTreeSet;

use crate::config::SignatureParams;
use crate::errors::{ErrorKey, JobErrors};
use crate::metadata::FileMetadata;
use crate::read_stats::ReadLengthHistogram;
use crate::state::{BarcodeCounts, RunSignatureState};

/// Suffix of signatures published for UMI runs.
pub const UMI_SUFFIX: &str = "UMI:";

/// Suffix of the coarse signatures published for multiplexed pools without a
/// dominant barcode. They are never conflict-checked.
pub const MIXED_SUFFIX: &str = "mixed:";

/// Which representation a file's published signatures were taken from.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignatureSource {
    /// Barcode-free signatures tagged `UMI:`.
    Umi,
    /// Barcodes that dominate a heavily multiplexed lane.
    DominantBarcodes,
    /// Barcode-free signatures tagged `mixed:`.
    Mixed,
    /// Every signature as collected, barcode included.
    Full,
}

/// The published signatures of a file, sorted.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub signatures: Vec<String>,
    pub source: SignatureSource,
}

/// Run every post-scan check and select the published signatures.
pub fn resolve(
    state: &RunSignatureState,
    item: &FileMetadata,
    params: &SignatureParams,
    errors: &mut JobErrors,
) -> Resolution {
    check_read_numbers(&state.read_numbers_seen, errors);
    check_read_length(&state.read_lengths, item.read_length, params, errors);
    let resolution = select_signatures(state, item.is_umi(), params);
    debug!(
        "published {} signatures from {:?}",
        resolution.signatures.len(),
        resolution.source
    );
    resolution
}

/// A file must contain a single read number.
pub fn check_read_numbers(read_numbers: &BTreeSet<String>, errors: &mut JobErrors) {
    if read_numbers.len() > 1 {
        errors.record_content_defect(
            ErrorKey::InconsistentReadNumbers,
            format!(
                "fastq file contains mixed read numbers {}.",
                read_numbers.iter().join(", ")
            ),
            "Fastq file contains a mixture of read1 and read2 sequences",
        );
    }
}

/// Compare observed read lengths to the declared one. A missing declaration is
/// a defect whatever the file contains.
pub fn check_read_length(
    lengths: &ReadLengthHistogram,
    declared: Option<u64>,
    params: &SignatureParams,
    errors: &mut JobErrors,
) {
    let observed = lengths.lengths().join(", ");
    match declared.filter(|&n| n > params.min_declared_read_length) {
        Some(read_length) => {
            let in_tolerance = lengths.reads_within(read_length, params.read_length_tolerance);
            if params.read_length_min_fraction * lengths.read_count() as f64 > in_tolerance as f64 {
                let observed = lengths
                    .buckets()
                    .map(|(len, n)| format!("len:{} count:{}", len, n))
                    .join(", ");
                errors.record_content_defect(
                    ErrorKey::ReadLength,
                    format!(
                        "in file metadata the read_length is {}, however the uploaded fastq file \
                         contains reads of following length(s) {}. ",
                        read_length, observed
                    ),
                    &format!(
                        "Fastq file metadata specified read length was {}, but the file contains \
                         read length(s) {}",
                        read_length, observed
                    ),
                );
            }
        }
        None => errors.record_content_defect(
            ErrorKey::ReadLength,
            format!(
                "no specified read length in the uploaded fastq file, while read length(s) found \
                 in the file were {}. ",
                observed
            ),
            &format!(
                "Fastq file metadata lacks read length information, but the file contains read \
                 length(s) {}",
                observed
            ),
        ),
    }
}

/// Choose the signature representation to publish.
///
/// Files with legacy headers always publish their full signature set. UMI
/// runs publish barcode-free signatures tagged `UMI:`. Heavily multiplexed
/// files publish only their dominant barcodes, or barcode-free signatures
/// tagged `mixed:` when no barcode dominates.
pub fn select_signatures(
    state: &RunSignatureState,
    is_umi: bool,
    params: &SignatureParams,
) -> Resolution {
    let tagged = |suffix: &str| -> Vec<String> {
        state
            .signatures_no_barcode
            .iter()
            .map(|s| format!("{}{}", s, suffix))
            .sorted()
            .collect()
    };

    if !state.has_legacy_signatures() && is_umi {
        return Resolution {
            signatures: tagged(UMI_SUFFIX),
            source: SignatureSource::Umi,
        };
    }

    if !state.has_legacy_signatures()
        && state.signatures.len() > params.multiplexed_signature_threshold
    {
        let dominant = dominant_barcodes(&state.barcode_counts, params.barcode_dominance_ratio);
        return if dominant.is_empty() {
            Resolution {
                signatures: tagged(MIXED_SUFFIX),
                source: SignatureSource::Mixed,
            }
        } else {
            Resolution {
                signatures: dominant.into_iter().collect(),
                source: SignatureSource::DominantBarcodes,
            }
        };
    }

    Resolution {
        signatures: state.signatures.iter().cloned().collect(),
        source: SignatureSource::Full,
    }
}

/// Signatures of barcodes holding more than `1 / ratio` of the reads in their
/// `(flowcell, lane, read_number)` group. Reads with an empty barcode form
/// their own bucket.
pub fn dominant_barcodes(counts: &BarcodeCounts, ratio: f64) -> BTreeSet<String> {
    let mut dominant = BTreeSet::new();
    for (lane_read, barcodes) in counts {
        let total: u64 = barcodes.values().sum();
        for (barcode, &count) in barcodes {
            if count > 0 && (total as f64) / (count as f64) < ratio {
                dominant.insert(lane_read.signature(barcode));
            }
        }
    }
    dominant
}
