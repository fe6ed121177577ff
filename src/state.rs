// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Accumulated signature state of one FASTQ scan.

use serde_derive::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{ErrorKey, JobErrors};
use crate::identity::{extract_declared, extract_identity, ExtractMode, Extraction};
use crate::metadata::ReadNameDetails;
use crate::read_stats::ReadLengthHistogram;

/// `(flowcell, lane, read_number)` of a barcode-bearing signature.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneRead {
    pub flowcell: String,
    pub lane: String,
    pub read_number: String,
}

impl LaneRead {
    /// `flowcell:lane:read_number:barcode:`
    pub fn signature(&self, barcode: &str) -> String {
        format!(
            "{}:{}:{}:{}:",
            self.flowcell, self.lane, self.read_number, barcode
        )
    }
}

/// Reads observed per barcode, grouped by flowcell, lane and read number.
pub type BarcodeCounts = BTreeMap<LaneRead, BTreeMap<String, u64>>;

/// State of one file-check scan. Created empty, updated by every header and
/// sequence line, and read-only once the stream ends.
#[derive(Serialize, Clone, Debug, Default)]
pub struct RunSignatureState {
    pub read_numbers_seen: BTreeSet<String>,
    pub signatures: BTreeSet<String>,
    pub signatures_no_barcode: BTreeSet<String>,
    #[serde(skip)]
    pub barcode_counts: BarcodeCounts,
    pub read_lengths: ReadLengthHistogram,
    /// Prefix of the last legacy signature emitted. `None` until a legacy
    /// header has been seen.
    pub old_illumina_current_prefix: Option<String>,
    #[serde(skip)]
    pub errors: JobErrors,
}

impl RunSignatureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one read-name line and fold its identity into the state.
    /// A declared layout bypasses format classification.
    pub fn process_read_name(&mut self, line: &str, layout: Option<&ReadNameDetails>) {
        let extraction = match layout {
            Some(details) => extract_declared(line, details),
            None => extract_identity(line, ExtractMode::Normal),
        };
        self.record(extraction);
    }

    /// Count one sequence line.
    pub fn process_sequence(&mut self, seq_line: &[u8]) {
        self.read_lengths.observe(seq_line);
    }

    /// Fold an extraction into the accumulated sets.
    pub fn record(&mut self, extraction: Extraction) {
        match extraction {
            Extraction::Indexed {
                identity,
                seen_read_number,
            } => {
                self.read_numbers_seen.extend(seen_read_number);
                self.signatures.insert(identity.signature());
                self.signatures_no_barcode
                    .insert(identity.signature_no_barcode());

                let key = LaneRead {
                    flowcell: identity.flowcell,
                    lane: identity.lane,
                    read_number: identity.read_number,
                };
                *self
                    .barcode_counts
                    .entry(key)
                    .or_default()
                    .entry(identity.barcode)
                    .or_insert(0) += 1;
            }
            Extraction::Legacy {
                identity,
                prefix,
                seen_read_number,
            } => {
                self.read_numbers_seen.extend(seen_read_number);
                // one signature per run of reads sharing a prefix
                if self.old_illumina_current_prefix.as_deref() != Some(prefix.as_str()) {
                    self.signatures.insert(identity.legacy_signature());
                    self.old_illumina_current_prefix = Some(prefix);
                }
            }
            Extraction::Sra { read_number, inner } => {
                self.read_numbers_seen.insert(read_number);
                self.record(*inner);
            }
            Extraction::Unrecognized { name } => {
                self.errors.record(ErrorKey::FastqFormatReadname, name);
            }
        }
    }

    pub fn read_count(&self) -> u64 {
        self.read_lengths.read_count()
    }

    /// True once any legacy header produced a signature.
    pub fn has_legacy_signatures(&self) -> bool {
        self.old_illumina_current_prefix.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_modern_reads() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@I:1:FC1:1:1101:1000:2000 1:N:0:ACGT", None);
        state.process_read_name("@I:1:FC1:1:1101:1001:2000 1:N:0:ACGT", None);
        state.process_read_name("@I:1:FC1:2:1101:1001:2000 1:N:0:TTTT", None);

        assert_eq!(state.read_numbers_seen, set(&["1"]));
        assert_eq!(state.signatures, set(&["FC1:1:1:ACGT:", "FC1:2:1:TTTT:"]));
        assert_eq!(state.signatures_no_barcode, set(&["FC1:1:1:", "FC1:2:1:"]));
        let lane1 = LaneRead {
            flowcell: "FC1".into(),
            lane: "1".into(),
            read_number: "1".into(),
        };
        assert_eq!(state.barcode_counts[&lane1]["ACGT"], 2);
        assert!(!state.has_legacy_signatures());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_sra_read_numbers() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@SRR1234567.1.1 INSTR1:1:FC1:1:1101:1000:2000/2", None);
        assert_eq!(state.read_numbers_seen, set(&["1"]));
        assert_eq!(
            state.signatures,
            set(&["INSTR1:1:1::@INSTR1:1:FC1:1:1101:1000:2000/2"])
        );
    }

    #[test]
    fn test_legacy_without_suffix_keeps_read_number() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@M:1:FC1:1:1101:1000:2000 2:N:0:ACGT", None);
        state.process_read_name("@HWUSI-EAS100R:6:73:941:1973#0", None);
        assert_eq!(state.read_numbers_seen, set(&["2"]));
        assert!(state
            .signatures
            .contains("TEMP:6:1::@HWUSI-EAS100R:6:73:941:1973#0"));

        let mut errors = JobErrors::new();
        crate::resolver::check_read_numbers(&state.read_numbers_seen, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unrecognized_sra_inner_reports_full_header() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@SRR1.1 SRR2.1 x\n", None);
        assert_eq!(
            state.errors.get(ErrorKey::FastqFormatReadname),
            Some("@SRR1.1 SRR2.1 x")
        );
        assert_eq!(state.read_numbers_seen, set(&["1"]));
        assert!(state.signatures.is_empty());
    }

    #[test]
    fn test_legacy_prefix_switch() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@HWI-1:1:1:1:1#0/1", None);
        state.process_read_name("@HWI-1:1:2:2:2#0/1", None);
        state.process_read_name("@HWI-1:2:1:1:1#0/1", None);
        // returning to an earlier prefix emits it again
        state.process_read_name("@HWI-1:1:3:3:3#0/1", None);
        assert_eq!(
            state.signatures,
            set(&[
                "TEMP:1:1::@HWI-1:1:1:1:1#0/1",
                "TEMP:2:1::@HWI-1:2:1:1:1#0/1",
                "TEMP:1:1::@HWI-1:1:3:3:3#0/1",
            ])
        );
        assert_eq!(
            state.old_illumina_current_prefix.as_deref(),
            Some("@HWI-1:1")
        );
    }

    #[test]
    fn test_unrecognized_is_diagnostic() {
        let mut state = RunSignatureState::new();
        state.process_read_name("@read_1\n", None);
        assert_eq!(state.errors.get(ErrorKey::FastqFormatReadname), Some("@read_1"));
        assert_eq!(state.errors.content_error(), None);
        assert!(state.signatures.is_empty());
    }

    #[test]
    fn test_declared_layout_overrides() {
        let details = ReadNameDetails {
            flowcell_id_location: 1,
            lane_id_location: 2,
            read_number_location: Some(3),
            barcode_location: None,
        };
        let mut state = RunSignatureState::new();
        state.process_read_name("@run FCZ 5 2", Some(&details));
        assert_eq!(state.signatures, set(&["FCZ:5:2::"]));
        assert_eq!(state.read_numbers_seen, set(&["2"]));
    }

    proptest! {
        #[test]
        fn prop_legacy_dedup(n in 1usize..200, x in 0u32..5000) {
            let mut state = RunSignatureState::new();
            for i in 0..n {
                let line = format!("@FLOW:3:{}:{}:{}", i, x, i + 7);
                state.process_read_name(&line, None);
            }
            prop_assert_eq!(state.signatures.len(), 1);
        }

        #[test]
        fn prop_no_barcode_projection(barcodes in proptest::collection::vec("[ACGT]{4}", 1..50)) {
            let mut state = RunSignatureState::new();
            for (i, bc) in barcodes.iter().enumerate() {
                let line = format!("@M:1:FC:{}:1101:{}:1 1:N:0:{}", i % 3 + 1, i, bc);
                state.process_read_name(&line, None);
            }
            prop_assert!(state.signatures_no_barcode.len() <= state.signatures.len());
        }
    }
}
