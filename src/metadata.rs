// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Metadata records of FASTQ files, as returned by the metadata API.

use anyhow::Result;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::utils;

/// Barcode marking a run whose index reads carry UMIs rather than sample indices.
pub const UMI_BARCODE: &str = "UMI";

/// One flowcell/lane/barcode declaration of a submitted file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowcellDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flowcell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

impl FlowcellDetail {
    pub fn new(lane: &str, barcode: &str) -> FlowcellDetail {
        FlowcellDetail {
            lane: Some(lane.to_string()),
            barcode: Some(barcode.to_string()),
            ..FlowcellDetail::default()
        }
    }
}

/// Positions of the signature fields in a read name whose layout was declared
/// by the submitter. Positions index the read name split on colons and
/// whitespace.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReadNameDetails {
    pub flowcell_id_location: usize,
    pub lane_id_location: usize,
    #[serde(default)]
    pub read_number_location: Option<usize>,
    #[serde(default)]
    pub barcode_location: Option<usize>,
}

/// The metadata record of the file being checked.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FileMetadata {
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub read_length: Option<u64>,
    #[serde(default)]
    pub flowcell_details: Vec<FlowcellDetail>,
    #[serde(default)]
    pub read_name_details: Option<ReadNameDetails>,
}

impl FileMetadata {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<FileMetadata> {
        utils::read_json(path)
    }

    /// True if any flowcell declaration marks the barcode as a UMI.
    pub fn is_umi(&self) -> bool {
        self.flowcell_details
            .iter()
            .any(|d| d.barcode.as_deref() == Some(UMI_BARCODE))
    }
}

/// An existing file returned by a signature query.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExistingFile {
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub flowcell_details: Vec<FlowcellDetail>,
}

/// True if the two declarations share at least one `(lane, barcode)` pair.
pub fn flowcell_details_overlap(a: &[FlowcellDetail], b: &[FlowcellDetail]) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.lane == y.lane && x.barcode == y.barcode))
}
