// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Derive the flowcell/lane/read/barcode identity of a read name.
//!
//! Extraction is pure: it looks at one read name and reports what it found.
//! Folding the result into the per-file state, including the once-per-prefix
//! policy for legacy headers, is done by [`RunSignatureState`](crate::state::RunSignatureState).

use serde_derive::{Deserialize, Serialize};

use crate::metadata::ReadNameDetails;
use crate::read_name::{
    classify_header, slash_read_suffix, split_illumina_fields, ReadHeader, ReadNameFormat,
};

/// Read number of a transitional header that carries no `/1` or `/2` suffix.
pub const READ_NUMBER_NOT_INITIALIZED: &str = "not initialized";

/// Read number assumed when a header does not carry one.
pub const DEFAULT_READ_NUMBER: &str = "1";

/// Normalized identity of one read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReadIdentity {
    pub flowcell: String,
    pub lane: String,
    pub read_number: String,
    pub barcode: String,
    pub raw_header: String,
}

impl ReadIdentity {
    /// `flowcell:lane:read_number:barcode:`
    pub fn signature(&self) -> String {
        format!(
            "{}:{}:{}:{}:",
            self.flowcell, self.lane, self.read_number, self.barcode
        )
    }

    /// `flowcell:lane:read_number:`
    pub fn signature_no_barcode(&self) -> String {
        format!("{}:{}:{}:", self.flowcell, self.lane, self.read_number)
    }

    /// `flowcell:lane:read_number::raw_header`, used by legacy headers that
    /// carry no barcode.
    pub fn legacy_signature(&self) -> String {
        format!(
            "{}:{}:{}::{}",
            self.flowcell, self.lane, self.read_number, self.raw_header
        )
    }
}

/// How the read number of a header is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractMode<'a> {
    /// From the header itself.
    Normal,
    /// From the wrapping SRA token. The header's own read number is ignored.
    SraForced { read_number: &'a str },
}

impl<'a> ExtractMode<'a> {
    /// Resolve the read number: the forced one, or `own` which is then
    /// reported as newly seen.
    fn read_number(self, own: &str) -> (String, Option<String>) {
        match self {
            ExtractMode::Normal => (own.to_string(), Some(own.to_string())),
            ExtractMode::SraForced { read_number } => (read_number.to_string(), None),
        }
    }
}

/// Outcome of extracting the identity of one read name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// Barcode-bearing identity, recorded for every read.
    Indexed {
        identity: ReadIdentity,
        seen_read_number: Option<String>,
    },
    /// Legacy identity, recorded once per distinct `prefix`.
    Legacy {
        identity: ReadIdentity,
        prefix: String,
        seen_read_number: Option<String>,
    },
    /// SRA-wrapped header: the SRA read number and the inner header's extraction.
    Sra {
        read_number: String,
        inner: Box<Extraction>,
    },
    Unrecognized { name: String },
}

impl Extraction {
    pub fn identity(&self) -> Option<&ReadIdentity> {
        match self {
            Extraction::Indexed { identity, .. } | Extraction::Legacy { identity, .. } => {
                Some(identity)
            }
            Extraction::Sra { inner, .. } => inner.identity(),
            Extraction::Unrecognized { .. } => None,
        }
    }

    fn unrecognized(header: &ReadHeader<'_>) -> Extraction {
        Extraction::Unrecognized {
            name: header.name.to_string(),
        }
    }
}

/// Classify `line` and extract its identity.
pub fn extract_identity(line: &str, mode: ExtractMode<'_>) -> Extraction {
    let header = ReadHeader::new(line);
    match classify_header(&header) {
        ReadNameFormat::ModernIllumina => extract_modern(&header, mode),
        ReadNameFormat::SpecialIllumina => extract_special(&header, mode),
        ReadNameFormat::Sra => match mode {
            ExtractMode::Normal => extract_sra(&header),
            // nested SRA tokens are not a known layout
            ExtractMode::SraForced { .. } => Extraction::unrecognized(&header),
        },
        ReadNameFormat::LegacyNewPrefix => extract_legacy_new_prefix(&header, mode),
        ReadNameFormat::LegacyOldFormat => extract_legacy_old_format(&header, mode),
        ReadNameFormat::Unrecognized => Extraction::unrecognized(&header),
    }
}

fn indexed_identity(
    header: &ReadHeader<'_>,
    read_number: String,
    seen_read_number: Option<String>,
) -> Extraction {
    let fields = split_illumina_fields(header.name);
    match (fields.get(2), fields.get(3), fields.last()) {
        (Some(flowcell), Some(lane), Some(barcode)) => Extraction::Indexed {
            identity: ReadIdentity {
                flowcell: flowcell.to_string(),
                lane: lane.to_string(),
                read_number,
                barcode: barcode.to_string(),
                raw_header: header.name.to_string(),
            },
            seen_read_number,
        },
        _ => Extraction::unrecognized(header),
    }
}

fn extract_modern(header: &ReadHeader<'_>, mode: ExtractMode<'_>) -> Extraction {
    let fields = split_illumina_fields(header.name);
    if fields.len() < 4 {
        return Extraction::unrecognized(header);
    }
    let (read_number, seen) = mode.read_number(fields[fields.len() - 4]);
    indexed_identity(header, read_number, seen)
}

fn extract_special(header: &ReadHeader<'_>, mode: ExtractMode<'_>) -> Extraction {
    let (read_number, seen) = match mode {
        ExtractMode::SraForced { read_number } => (read_number.to_string(), None),
        ExtractMode::Normal => {
            let suffix = header
                .words
                .first()
                .filter(|w| w.len() > 3)
                .and_then(|w| slash_read_suffix(w));
            match suffix {
                Some(n) => (n.to_string(), Some(n.to_string())),
                None => (READ_NUMBER_NOT_INITIALIZED.to_string(), None),
            }
        }
    };
    indexed_identity(header, read_number, seen)
}

fn extract_sra(header: &ReadHeader<'_>) -> Extraction {
    let token = header.sra_token();
    let read_number = if token.matches('.').count() == 2 {
        &token[token.len() - 1..]
    } else {
        DEFAULT_READ_NUMBER
    };
    let inner = match header.sra_inner() {
        Some(inner) => extract_identity(&inner, ExtractMode::SraForced { read_number }),
        None => return Extraction::unrecognized(header),
    };
    // report the header as submitted, not the rebuilt inner token
    let inner = match inner {
        Extraction::Unrecognized { .. } => Extraction::unrecognized(header),
        other => other,
    };
    Extraction::Sra {
        read_number: read_number.to_string(),
        inner: Box::new(inner),
    }
}

fn extract_legacy_new_prefix(header: &ReadHeader<'_>, mode: ExtractMode<'_>) -> Extraction {
    let (read_number, seen) = mode.read_number(DEFAULT_READ_NUMBER);
    let fields: Vec<&str> = header.name.split(':').collect();
    if fields.len() <= 3 {
        return Extraction::unrecognized(header);
    }
    let identity = ReadIdentity {
        flowcell: fields[2].to_string(),
        lane: fields[3].to_string(),
        read_number,
        barcode: String::new(),
        raw_header: header.name.to_string(),
    };
    Extraction::Legacy {
        prefix: format!("{}:{}", identity.flowcell, identity.lane),
        identity,
        seen_read_number: seen,
    }
}

fn extract_legacy_old_format(header: &ReadHeader<'_>, mode: ExtractMode<'_>) -> Extraction {
    // only a /1 or /2 suffix counts as a seen read number
    let (read_number, seen) = match slash_read_suffix(header.name) {
        Some(own) => mode.read_number(own),
        None => (mode.read_number(DEFAULT_READ_NUMBER).0, None),
    };
    let fields: Vec<&str> = header.name.split(':').collect();
    if fields.len() < 2 {
        return Extraction::unrecognized(header);
    }

    let mut flowcell = fields[0].strip_prefix('@').unwrap_or(fields[0]);
    // not a flowcell id, keep the signature generic
    if flowcell.contains('-') || flowcell.contains('_') {
        flowcell = "TEMP";
    }
    // the raw header is part of the signature, so a non-numeric lane loses nothing
    let lane = if !fields[1].is_empty() && fields[1].bytes().all(|b| b.is_ascii_digit()) {
        fields[1]
    } else {
        "0"
    };

    Extraction::Legacy {
        prefix: format!("{}:{}", fields[0], fields[1]),
        identity: ReadIdentity {
            flowcell: flowcell.to_string(),
            lane: lane.to_string(),
            read_number,
            barcode: String::new(),
            raw_header: header.name.to_string(),
        },
        seen_read_number: seen,
    }
}

/// Extract the identity of a read name whose field positions were declared by
/// the submitter, bypassing format classification.
pub fn extract_declared(line: &str, details: &ReadNameDetails) -> Extraction {
    let header = ReadHeader::new(line);
    let fields: Vec<&str> = header
        .name
        .split(|c: char| c == ':' || c.is_whitespace())
        .collect();

    let flowcell = declared_field(&fields, Some(details.flowcell_id_location), "");
    let lane = declared_field(&fields, Some(details.lane_id_location), "");
    let read_number = declared_field(&fields, details.read_number_location, DEFAULT_READ_NUMBER);
    let barcode = declared_field(&fields, details.barcode_location, "");

    match (flowcell, lane, read_number, barcode) {
        (Some(flowcell), Some(lane), Some(read_number), Some(barcode)) => Extraction::Indexed {
            identity: ReadIdentity {
                flowcell: flowcell.to_string(),
                lane: lane.to_string(),
                read_number: read_number.to_string(),
                barcode: barcode.to_string(),
                raw_header: header.name.to_string(),
            },
            seen_read_number: Some(read_number.to_string()),
        },
        _ => Extraction::unrecognized(&header),
    }
}

fn declared_field<'a>(fields: &[&'a str], pos: Option<usize>, default: &'a str) -> Option<&'a str> {
    match pos {
        Some(p) => fields.get(p).copied(),
        None => Some(default),
    }
}
