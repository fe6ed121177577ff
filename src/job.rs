// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Signature check of one FASTQ file, from the decompressed stream to the
//! result reported to the metadata API.

use log::info;
use serde_derive::Serialize;
use std::io::BufRead;

use crate::config::SignatureParams;
use crate::conflict::{check_signature_conflicts, MetadataService};
use crate::errors::JobErrors;
use crate::metadata::FileMetadata;
use crate::resolver::{resolve, SignatureSource};
use crate::scan::scan_fastq;

/// Outputs of a check destined for the metadata API.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub fastq_signature: Vec<String>,
    pub read_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_gzipped: Option<bool>,
}

/// Where the file goes next.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// At least one content defect; the upload is rejected.
    ContentError,
    /// No defect found, but a lookup or the stream failed; retry the check.
    Inconclusive,
    /// The file advances to processing.
    InProgress,
}

/// One file-check job: the file's metadata record, its result and its errors.
#[derive(Serialize, Clone, Debug)]
pub struct FileCheckJob {
    #[serde(skip)]
    pub item: FileMetadata,
    pub result: CheckResult,
    pub errors: JobErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_source: Option<SignatureSource>,
}

impl FileCheckJob {
    pub fn new(item: FileMetadata) -> FileCheckJob {
        FileCheckJob {
            item,
            result: CheckResult::default(),
            errors: JobErrors::new(),
            signature_source: None,
        }
    }

    /// Scan the decompressed FASTQ `reader`, publish its signature and check
    /// the signature against existing files.
    pub fn check_fastq<R: BufRead, S: MetadataService + ?Sized>(
        &mut self,
        reader: R,
        service: &S,
        params: &SignatureParams,
    ) -> CheckStatus {
        info!(
            "start signature scan: {}",
            self.item.accession.as_deref().unwrap_or("<no accession>")
        );
        let state = scan_fastq(reader, self.item.read_name_details.clone());
        for (key, message) in state.errors.iter() {
            self.errors.record(key, message);
        }

        let resolution = resolve(&state, &self.item, params, &mut self.errors);
        self.result.fastq_signature = resolution.signatures;
        self.result.read_count = state.read_count();
        self.signature_source = Some(resolution.source);
        info!(
            "done signature scan: {} reads, {} signatures",
            self.result.read_count,
            self.result.fastq_signature.len()
        );

        check_signature_conflicts(
            service,
            &self.item,
            &self.result.fastq_signature,
            &mut self.errors,
        );
        self.status()
    }

    pub fn status(&self) -> CheckStatus {
        if self.errors.content_error().is_some() {
            CheckStatus::ContentError
        } else if self.errors.has_transient() {
            CheckStatus::Inconclusive
        } else {
            CheckStatus::InProgress
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conflict::{LocalMetadataService, StoredFile};
    use crate::errors::ErrorKey;
    use crate::metadata::{FlowcellDetail, ReadNameDetails};
    use crate::utils;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn item(read_length: Option<u64>) -> FileMetadata {
        FileMetadata {
            accession: Some("ENCFF100NEW".into()),
            read_length,
            ..FileMetadata::default()
        }
    }

    #[test]
    fn test_clean_file() -> Result<()> {
        let mut job = FileCheckJob::new(item(Some(36)));
        let status = job.check_fastq(
            utils::open_with_gz("test/fastq/modern_r1.fastq.gz")?,
            &LocalMetadataService::default(),
            &SignatureParams::default(),
        );
        assert_eq!(status, CheckStatus::InProgress);
        assert_eq!(job.result.read_count, 4);
        assert_eq!(
            job.result.fastq_signature,
            vec!["HFWH3DSXX:2:1:GCATAAGCTT+GGCGACGGAA:", "HFWH3DSXX:3:1:GCATAAGCTT+GGCGACGGAA:"]
        );
        assert_eq!(job.signature_source, Some(SignatureSource::Full));
        assert!(job.errors.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_read_length_always_flagged() -> Result<()> {
        let mut job = FileCheckJob::new(item(None));
        let status = job.check_fastq(
            utils::open_with_gz("test/fastq/modern_r1.fastq")?,
            &LocalMetadataService::default(),
            &SignatureParams::default(),
        );
        assert_eq!(status, CheckStatus::ContentError);
        assert!(job.errors.contains(ErrorKey::ReadLength));
        assert!(job
            .errors
            .content_error()
            .unwrap()
            .contains("lacks read length information"));
        Ok(())
    }

    #[test]
    fn test_mixed_reads_and_conflict() -> Result<()> {
        let service = LocalMetadataService::new(vec![StoredFile {
            accession: Some("ENCFF001OLD".into()),
            status: Some("released".into()),
            file_format: Some("fastq".into()),
            fastq_signature: vec!["C0LTJACXX:5:2:CGATGT:".into()],
            flowcell_details: vec![],
        }]);
        let mut job = FileCheckJob::new(item(Some(50)));
        let status = job.check_fastq(
            utils::open_with_gz("test/fastq/mixed_reads.fastq")?,
            &service,
            &SignatureParams::default(),
        );
        assert_eq!(status, CheckStatus::ContentError);
        assert_eq!(
            job.errors.get(ErrorKey::InconsistentReadNumbers),
            Some("fastq file contains mixed read numbers 1, 2.")
        );
        assert_eq!(
            job.errors.content_error(),
            Some(
                "Fastq file contains a mixture of read1 and read2 sequences, \
                 Fastq file contains read name signature that conflict with signature of \
                 existing file(s): C0LTJACXX:5:2:CGATGT: in file ENCFF001OLD "
            )
        );
        Ok(())
    }

    #[test]
    fn test_legacy_file() -> Result<()> {
        let mut job = FileCheckJob::new(item(Some(36)));
        let status = job.check_fastq(
            utils::open_with_gz("test/fastq/legacy.fastq")?,
            &LocalMetadataService::default(),
            &SignatureParams::default(),
        );
        assert_eq!(status, CheckStatus::InProgress);
        assert_eq!(job.result.read_count, 3);
        assert_eq!(
            job.result.fastq_signature,
            vec![
                "TEMP:6:1::@HWUSI-EAS100R:6:73:941:1973#0/1",
                "TEMP:7:1::@HWUSI-EAS100R:7:1:1:1#0/1",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_umi_conflict_with_stored_files() -> Result<()> {
        let service = LocalMetadataService::from_json_file("test/metadata/existing.json")?;
        let mut job = FileCheckJob::new(FileMetadata::from_json_file("test/metadata/item_umi.json")?);
        let status = job.check_fastq(
            utils::open_with_gz("test/fastq/modern_r1.fastq.lz4")?,
            &service,
            &SignatureParams::default(),
        );
        assert_eq!(status, CheckStatus::ContentError);
        assert_eq!(job.signature_source, Some(SignatureSource::Umi));
        assert_eq!(
            job.result.fastq_signature,
            vec!["HFWH3DSXX:2:1:UMI:", "HFWH3DSXX:3:1:UMI:"]
        );
        // the lane 3 match belongs to a replaced file
        assert_eq!(
            job.errors.get(ErrorKey::NotUniqueFlowcellDetails),
            Some(
                "Fastq file contains read name signatures that conflict with signatures from \
                 existing files: HFWH3DSXX:2:1:UMI: in file ENCFF001OLD "
            )
        );
        Ok(())
    }

    #[test]
    fn test_umi_lookup_failure_inconclusive() {
        struct Offline;
        impl MetadataService for Offline {
            fn query_by_signature(
                &self,
                signature: &str,
            ) -> std::result::Result<Vec<crate::metadata::ExistingFile>, crate::errors::CheckError>
            {
                Err(crate::errors::CheckError::Lookup {
                    signature: signature.to_string(),
                    reason: "timed out".into(),
                })
            }
        }

        let mut item = item(Some(4));
        item.flowcell_details = vec![FlowcellDetail::new("1", "UMI")];
        let mut job = FileCheckJob::new(item);
        let data: &[u8] = b"@A:1:FC7:1:1:1:1 1:N:0:ACGT\nACGT\n+\nIIII\n";
        let status = job.check_fastq(data, &Offline, &SignatureParams::default());
        assert_eq!(status, CheckStatus::Inconclusive);
        assert_eq!(job.result.fastq_signature, vec!["FC7:1:1:UMI:"]);
        assert!(job.errors.contains(ErrorKey::LookupForFastqSignature));
    }

    #[test]
    fn test_declared_layout() {
        let mut item = item(Some(4));
        item.read_name_details = Some(ReadNameDetails {
            flowcell_id_location: 1,
            lane_id_location: 2,
            read_number_location: None,
            barcode_location: Some(3),
        });
        let mut job = FileCheckJob::new(item);
        let data: &[u8] = b"@run:FCQ:4:TTAG extra\nACGT\n+\nIIII\n";
        let status = job.check_fastq(data, &LocalMetadataService::default(), &SignatureParams::default());
        assert_eq!(status, CheckStatus::InProgress);
        assert_eq!(job.result.fastq_signature, vec!["FCQ:4:1:TTAG:"]);
    }

    #[test]
    fn test_report_json() {
        let mut job = FileCheckJob::new(item(Some(4)));
        let data: &[u8] = b"@read\nACGT\n+\nIIII\n";
        job.check_fastq(data, &LocalMetadataService::default(), &SignatureParams::default());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "result": {"fastq_signature": [], "read_count": 1},
                "errors": {"fastq_format_readname": "@read"},
                "signature_source": "full"
            })
        );
    }
}
