// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Diagnostics accumulated while checking one FASTQ file.
//!
//! Nothing found in the file content aborts a check. Every problem is recorded
//! under an [`ErrorKey`] in [`JobErrors`], and content defects additionally
//! append a human-readable message to the aggregated `content_error` field.

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Keys of the error mapping reported back to the metadata API.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKey {
    InconsistentReadNumbers,
    ReadLength,
    FastqFormatReadname,
    ReadnameEncoding,
    NotUniqueFlowcellDetails,
    LookupForFastqSignature,
    UnzippedFastqStreaming,
}

impl ErrorKey {
    /// Infrastructure problems. They leave the check inconclusive rather than
    /// marking the file as defective.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKey::LookupForFastqSignature
                | ErrorKey::UnzippedFastqStreaming
                | ErrorKey::ReadnameEncoding
        )
    }
}

/// The `errors` mapping of a file-check job.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct JobErrors {
    #[serde(flatten)]
    entries: BTreeMap<ErrorKey, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_error: Option<String>,
}

impl JobErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `key`, replacing an earlier message for the same key.
    pub fn record(&mut self, key: ErrorKey, message: impl Into<String>) {
        self.entries.insert(key, message.into());
    }

    /// Append `message` to the aggregated content error. Existing text is kept
    /// and the new message is joined with `", "`.
    pub fn add_content_error(&mut self, message: &str) {
        match self.content_error {
            Some(ref mut existing) => {
                existing.push_str(", ");
                existing.push_str(message);
            }
            None => self.content_error = Some(message.to_string()),
        }
    }

    /// Record a content defect: a specific key plus an aggregated message.
    pub fn record_content_defect(&mut self, key: ErrorKey, message: String, content: &str) {
        self.record(key, message);
        self.add_content_error(content);
    }

    pub fn get(&self, key: ErrorKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: ErrorKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn content_error(&self) -> Option<&str> {
        self.content_error.as_deref()
    }

    pub fn has_transient(&self) -> bool {
        self.entries.keys().any(|k| k.is_transient())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.content_error.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Failures of the collaborators the signature engine depends on.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The metadata service could not answer a signature query.
    #[error("signature lookup for '{signature}' failed: {reason}")]
    Lookup { signature: String, reason: String },

    /// A metadata record could not be decoded.
    #[error("invalid metadata in {source_name}: {reason}")]
    InvalidMetadata { source_name: String, reason: String },
}
