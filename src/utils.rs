// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Utility methods.

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::errors::CheckError;

const GZ_BUF_SIZE: usize = 1 << 22;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const LZ4_MAGIC: [u8; 4] = [0x04, 0x22, 0x4d, 0x18];

/// Compression of a FASTQ file, determined from its leading bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Lz4,
    Plain,
}

fn sniff(file: &mut File) -> std::io::Result<Compression> {
    let mut magic = Vec::with_capacity(LZ4_MAGIC.len());
    file.by_ref()
        .take(LZ4_MAGIC.len() as u64)
        .read_to_end(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    Ok(if magic.starts_with(&GZIP_MAGIC) {
        Compression::Gzip
    } else if magic.starts_with(&LZ4_MAGIC) {
        Compression::Lz4
    } else {
        Compression::Plain
    })
}

/// Detect the compression of the file at `p`.
pub fn detect_compression(p: impl AsRef<Path>) -> Result<Compression> {
    let path = p.as_ref();
    let mut file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    sniff(&mut file).with_context(|| format!("reading {:?}", path))
}

/// True if the file at `p` starts with the gzip magic bytes.
pub fn is_gzipped(p: impl AsRef<Path>) -> Result<bool> {
    Ok(detect_compression(p)? == Compression::Gzip)
}

/// Open a (possibly gzipped or lz4-compressed) file into a BufRead. The
/// extension is ignored, the format is determined by the leading bytes.
pub fn open_with_gz(p: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = p.as_ref();
    let mut file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let compression = sniff(&mut file).with_context(|| format!("reading {:?}", path))?;

    let reader: Box<dyn BufRead> = match compression {
        Compression::Gzip => Box::new(BufReader::with_capacity(
            GZ_BUF_SIZE,
            MultiGzDecoder::new(file),
        )),
        Compression::Lz4 => {
            let lz = lz4::Decoder::new(file)
                .with_context(|| format!("opening lz4 stream {:?}", path))?;
            Box::new(BufReader::with_capacity(GZ_BUF_SIZE, lz))
        }
        Compression::Plain => Box::new(BufReader::with_capacity(32 * 1024, file)),
    };
    Ok(reader)
}

/// Deserialize an object of type `T` from the JSON file `filename`.
pub fn read_json<T: DeserializeOwned>(filename: impl AsRef<Path>) -> Result<T> {
    let path = filename.as_ref();
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {:?}", path))?);
    serde_json::from_reader(reader).map_err(|e| {
        CheckError::InvalidMetadata {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
