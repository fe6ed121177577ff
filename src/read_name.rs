// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Classify FASTQ read names across the naming conventions used by Illumina
//! instruments over time, and by the Sequence Read Archive.
//!
//! Formats are tried in a fixed order: the fully specified modern Illumina
//! layout first, then the transitional layout with a `/1` or `/2` suffix,
//! then SRA-wrapped headers, and finally the loose single-token rules for
//! legacy headers. Specific patterns must be tried before the loose ones or a
//! well-formed modern header can be mistaken for a legacy one.

use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};

lazy_static! {
    /// `@<instrument>:<run>:<flowcell>:<lane>:<tile>:<x>:<y> <read>:<Y|N>:<filter>:<index>`
    static ref MODERN_ILLUMINA_REGEX: Regex = Regex::new(
        r"^@[a-zA-Z0-9]+[a-zA-Z0-9_-]*:[a-zA-Z0-9-]+:[a-zA-Z0-9_-]+:[0-9]+:[0-9]+:[0-9]+:[0-9]+[ \t_][123]:[YXN]:[0-9]+:([ACNTG+]*|[0-9]*)$"
    )
    .unwrap();
    /// Same as the modern layout, with an optional `/1` or `/2` after the coordinates.
    static ref SPECIAL_ILLUMINA_REGEX: Regex = Regex::new(
        r"^@[a-zA-Z0-9]+[a-zA-Z0-9_-]*:[a-zA-Z0-9-]+:[a-zA-Z0-9_-]+:[0-9]+:[0-9]+:[0-9]+:[0-9]+(/[12])?[ \t_][123]:[YXN]:[0-9]+:([ACNTG+]*|[0-9]*)$"
    )
    .unwrap();
    /// Modern 7-field prefix with no read/filter/index suffix.
    static ref ILLUMINA_PREFIX_REGEX: Regex = Regex::new(
        r"^@[a-zA-Z0-9]+[a-zA-Z0-9_-]*:[a-zA-Z0-9-]+:[a-zA-Z0-9_-]+:[0-9]+:[0-9]+:[0-9]+:[0-9]+$"
    )
    .unwrap();
    /// First token of an SRA header, e.g. `@SRR1234567.2` or `@SRR1234567.55.1`.
    static ref SRA_TOKEN_REGEX: Regex = Regex::new(r"^@SRR[0-9]+(\.[0-9]+)*$").unwrap();
}

/// The naming convention a read name was recognized as.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadNameFormat {
    /// Casava 1.8+ Illumina header with read, filter, control and index fields.
    ModernIllumina,
    /// Transitional Illumina header carrying a `/1` or `/2` read suffix.
    SpecialIllumina,
    /// SRA accession token wrapping an Illumina-style header.
    Sra,
    /// Modern 7-field prefix alone, without the read/index comment.
    LegacyNewPrefix,
    /// Pre-Casava 1.8 colon-delimited header.
    LegacyOldFormat,
    Unrecognized,
}

/// A read-name line prepared for classification: stripped of surrounding
/// whitespace and split into whitespace-delimited words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadHeader<'a> {
    pub name: &'a str,
    pub words: Vec<&'a str>,
}

impl<'a> ReadHeader<'a> {
    pub fn new(line: &'a str) -> ReadHeader<'a> {
        let name = line.trim();
        ReadHeader {
            name,
            words: name.split_whitespace().collect(),
        }
    }

    /// The inner Illumina header of an SRA read name, with `@` restored.
    /// Only available when the name is split on a single space into at least
    /// two tokens.
    pub fn sra_inner(&self) -> Option<String> {
        self.name.split(' ').nth(1).map(|inner| format!("@{}", inner))
    }

    /// The SRA accession token, split on a single space.
    pub fn sra_token(&self) -> &'a str {
        self.name.split(' ').next().unwrap_or(self.name)
    }
}

type Predicate = fn(&ReadHeader<'_>) -> bool;

fn is_modern(header: &ReadHeader<'_>) -> bool {
    MODERN_ILLUMINA_REGEX.is_match(header.name)
}

fn is_special(header: &ReadHeader<'_>) -> bool {
    SPECIAL_ILLUMINA_REGEX.is_match(header.name)
}

fn is_sra(header: &ReadHeader<'_>) -> bool {
    SRA_TOKEN_REGEX.is_match(header.sra_token()) && header.sra_inner().is_some()
}

fn is_legacy_new_prefix(header: &ReadHeader<'_>) -> bool {
    header.words.len() == 1 && ILLUMINA_PREFIX_REGEX.is_match(header.name)
}

fn is_legacy_old_format(header: &ReadHeader<'_>) -> bool {
    header.words.len() == 1
        && header.name.len() > 3
        && header.name.matches(':').count() > 2
}

/// Classification table, in precedence order.
const CLASSIFIERS: [(Predicate, ReadNameFormat); 5] = [
    (is_modern, ReadNameFormat::ModernIllumina),
    (is_special, ReadNameFormat::SpecialIllumina),
    (is_sra, ReadNameFormat::Sra),
    (is_legacy_new_prefix, ReadNameFormat::LegacyNewPrefix),
    (is_legacy_old_format, ReadNameFormat::LegacyOldFormat),
];

/// Assign exactly one format to a prepared header.
pub fn classify_header(header: &ReadHeader<'_>) -> ReadNameFormat {
    CLASSIFIERS
        .iter()
        .find(|(matches, _)| matches(header))
        .map(|(_, format)| *format)
        .unwrap_or(ReadNameFormat::Unrecognized)
}

/// Assign exactly one format to a raw read-name line.
pub fn classify(line: &str) -> ReadNameFormat {
    classify_header(&ReadHeader::new(line))
}

/// Split a read name on colons, underscores and whitespace, the field
/// boundaries of the Illumina layouts.
pub(crate) fn split_illumina_fields(name: &str) -> Vec<&str> {
    name.split(|c: char| c == ':' || c == '_' || c.is_whitespace())
        .collect()
}

/// Last character of `s` if it ends with `/1` or `/2`.
pub(crate) fn slash_read_suffix(s: &str) -> Option<&str> {
    if s.ends_with("/1") || s.ends_with("/2") {
        Some(&s[s.len() - 1..])
    } else {
        None
    }
}
