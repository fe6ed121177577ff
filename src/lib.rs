// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Derive read-name signatures of FASTQ files.
//!
//! A signature is a set of `flowcell:lane:read_number:barcode:` strings
//! summarizing which sequencing runs the reads of a file came from. Read names
//! are classified across the modern, transitional and legacy Illumina
//! conventions and SRA-wrapped headers, folded into per-file state while the
//! file is streamed, and resolved into the published signature once the stream
//! ends. Published signatures are checked against existing files to detect
//! duplicate submissions.
//!
//! ```
//! use fastq_signature::{FileCheckJob, FileMetadata, LocalMetadataService, SignatureParams};
//!
//! let fastq: &[u8] = b"@INSTR1:1:FC1:1:1101:1000:2000 1:N:0:ACGTACGT\nACGT\n+\nIIII\n";
//! let item = FileMetadata { read_length: Some(4), ..FileMetadata::default() };
//! let mut job = FileCheckJob::new(item);
//! job.check_fastq(fastq, &LocalMetadataService::default(), &SignatureParams::default());
//! assert_eq!(job.result.fastq_signature, vec!["FC1:1:1:ACGTACGT:"]);
//! ```

pub mod config;
pub mod conflict;
pub mod errors;
pub mod identity;
pub mod job;
pub mod metadata;
pub mod read_name;
pub mod read_stats;
pub mod resolver;
pub mod scan;
pub mod state;
pub mod utils;

pub use config::SignatureParams;
pub use conflict::{check_signature_conflicts, LocalMetadataService, MetadataService};
pub use errors::{CheckError, ErrorKey, JobErrors};
pub use identity::{extract_identity, ExtractMode, Extraction, ReadIdentity};
pub use job::{CheckResult, CheckStatus, FileCheckJob};
pub use metadata::{ExistingFile, FileMetadata, FlowcellDetail, ReadNameDetails};
pub use read_name::{classify, ReadNameFormat};
pub use resolver::{resolve, Resolution, SignatureSource};
pub use scan::{scan_fastq, LineScanner};
pub use state::RunSignatureState;
