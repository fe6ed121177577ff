// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Detect submissions whose read-name signatures are already claimed by other
//! files in the repository.

use anyhow::Result;
use itertools::Itertools;
use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{CheckError, ErrorKey, JobErrors};
use crate::metadata::{flowcell_details_overlap, ExistingFile, FileMetadata, FlowcellDetail};
use crate::resolver::MIXED_SUFFIX;
use crate::utils;

/// Lookup of existing FASTQ files by signature. Implementations must read
/// committed state, not an eventually consistent index.
pub trait MetadataService {
    /// Existing, non-replaced FASTQ files carrying exactly `signature`.
    fn query_by_signature(&self, signature: &str) -> Result<Vec<ExistingFile>, CheckError>;
}

/// Check every published signature against existing files. Returns `false`
/// when a conflict was found. Lookup failures are recorded as transient
/// errors and do not count as conflicts.
pub fn check_signature_conflicts<S: MetadataService + ?Sized>(
    service: &S,
    item: &FileMetadata,
    signatures: &[String],
    errors: &mut JobErrors,
) -> bool {
    let mut conflicts = Vec::new();

    for signature in signatures.iter().sorted() {
        if signature.ends_with(MIXED_SUFFIX) {
            continue;
        }
        match service.query_by_signature(signature) {
            Ok(matches) => {
                for existing in &matches {
                    if let Some(conflict) = describe_conflict(signature, item, existing) {
                        conflicts.push(conflict);
                    }
                }
            }
            Err(e) => {
                warn!("fastq signature lookup failed: {}", e);
                errors.record(
                    ErrorKey::LookupForFastqSignature,
                    format!(
                        "Network error occured, while looking for fastq signature conflict on the portal. {}",
                        e
                    ),
                );
            }
        }
    }

    if conflicts.is_empty() {
        return true;
    }

    debug!("{} signature conflicts found", conflicts.len());
    let listed = conflicts.iter().join(", ");
    errors.record_content_defect(
        ErrorKey::NotUniqueFlowcellDetails,
        format!(
            "Fastq file contains read name signatures that conflict with signatures from existing files: {}",
            listed
        ),
        &format!(
            "Fastq file contains read name signature that conflict with signature of existing file(s): {}",
            listed
        ),
    );
    false
}

/// Describe the conflict between `item` and an `existing` file sharing
/// `signature`, if there is one.
///
/// Signatures ending in `::` carry no barcode from the read name, so they only
/// conflict when both files declare a common lane and barcode.
fn describe_conflict(signature: &str, item: &FileMetadata, existing: &ExistingFile) -> Option<String> {
    let barcode_free = signature.ends_with("::");
    if barcode_free
        && !(has_details(&existing.flowcell_details)
            && has_details(&item.flowcell_details)
            && flowcell_details_overlap(&existing.flowcell_details, &item.flowcell_details))
    {
        return None;
    }

    match (&existing.accession, &item.accession) {
        (Some(theirs), Some(ours)) if theirs != ours => {
            Some(format!("{} in file {} ", signature, theirs))
        }
        (Some(theirs), None) => Some(format!("{} in file {} ", signature, theirs)),
        (None, None) => Some(format!("{} file on the portal.", signature)),
        _ => None,
    }
}

fn has_details(details: &[FlowcellDetail]) -> bool {
    !details.is_empty()
}

/// A file record held by [`LocalMetadataService`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredFile {
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
    #[serde(default)]
    pub fastq_signature: Vec<String>,
    #[serde(default)]
    pub flowcell_details: Vec<FlowcellDetail>,
}

/// Metadata service answering from an in-memory list of files, loaded from a
/// JSON array.
#[derive(Clone, Debug, Default)]
pub struct LocalMetadataService {
    files: Vec<StoredFile>,
}

impl LocalMetadataService {
    pub fn new(files: Vec<StoredFile>) -> Self {
        LocalMetadataService { files }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(LocalMetadataService::new(utils::read_json(path)?))
    }
}

impl MetadataService for LocalMetadataService {
    fn query_by_signature(&self, signature: &str) -> Result<Vec<ExistingFile>, CheckError> {
        Ok(self
            .files
            .iter()
            .filter(|f| f.status.as_deref() != Some("replaced"))
            .filter(|f| f.file_format.as_deref().map_or(true, |fmt| fmt == "fastq"))
            .filter(|f| f.fastq_signature.iter().any(|s| s == signature))
            .map(|f| ExistingFile {
                accession: f.accession.clone(),
                flowcell_details: f.flowcell_details.clone(),
            })
            .collect())
    }
}
