// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Compute the read-name signature of a FASTQ file and check it against
//! existing files. Prints a JSON report.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use fastq_signature::conflict::LocalMetadataService;
use fastq_signature::utils;
use fastq_signature::{CheckStatus, FileCheckJob, FileMetadata, SignatureParams};

/// Check the read-name signature of a FASTQ file
#[derive(Parser, Debug)]
#[clap(name = "check_fastq")]
struct Args {
    /// FASTQ file, plain, gzip or lz4 compressed
    fastq: PathBuf,

    /// JSON metadata record of the file
    #[clap(long)]
    metadata: PathBuf,

    /// JSON array of existing files to check signatures against
    #[clap(long)]
    existing: Option<PathBuf>,

    /// JSON file overriding the signature thresholds
    #[clap(long)]
    params: Option<PathBuf>,

    /// Pretty-print the report
    #[clap(long)]
    pretty: bool,
}

fn run(args: &Args) -> Result<CheckStatus> {
    let item = FileMetadata::from_json_file(&args.metadata)?;
    let service = match args.existing {
        Some(ref path) => LocalMetadataService::from_json_file(path)?,
        None => LocalMetadataService::default(),
    };
    let params = match args.params {
        Some(ref path) => SignatureParams::from_json_file(path)?,
        None => SignatureParams::default(),
    };

    let is_gzipped = utils::is_gzipped(&args.fastq)?;
    let reader = utils::open_with_gz(&args.fastq)?;

    info!("checking {:?}", args.fastq);
    let mut job = FileCheckJob::new(item);
    job.result.is_gzipped = Some(is_gzipped);
    let status = job.check_fastq(reader, &service, &params);

    let report = serde_json::json!({
        "status": status,
        "result": job.result,
        "errors": job.errors,
        "signature_source": job.signature_source,
    });
    let out = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("serializing report")?;
    println!("{}", out);
    Ok(status)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(status) => {
            info!("{:?}: {:?}", args.fastq, status);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
