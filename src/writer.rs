use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::{Record, Segment};
use crate::error::LassaError;
use crate::metadata;

pub const L_FASTA: &str = "lassa_l_segments.fasta";
pub const S_FASTA: &str = "lassa_s_segments.fasta";
pub const UNKNOWN_FASTA: &str = "lassa_unknown_segments.fasta";
pub const UNKNOWN_HEADERS: &str = "unknown_segments_headers.txt";

const FASTA_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WrittenCounts {
    pub l: usize,
    pub s: usize,
    pub unknown: usize,
}

/// Persists the final curated collection as three per-segment FASTA files
/// plus a listing of the original headers of Unknown-segment records.
///
/// Headers are rewritten here, at the terminal stage: the FASTA identifier is
/// `{accession}_{country}_{date}` and the free-text description is dropped.
/// Each file is staged in a temp file and atomically renamed into place, so a
/// failed or cancelled run leaves no partial output.
pub struct SequenceWriter {
    outdir: Utf8PathBuf,
}

impl SequenceWriter {
    pub fn new(outdir: Utf8PathBuf) -> Self {
        Self { outdir }
    }

    pub fn write_all(&self, collection: &[Record]) -> Result<WrittenCounts, LassaError> {
        fs::create_dir_all(self.outdir.as_std_path())
            .map_err(|err| LassaError::Filesystem(err.to_string()))?;

        let mut l_records = Vec::new();
        let mut s_records = Vec::new();
        let mut unknown_records = Vec::new();
        for record in collection {
            match record.segment() {
                Segment::L => l_records.push(record),
                Segment::S => s_records.push(record),
                Segment::Unknown => unknown_records.push(record),
            }
        }

        self.write_fasta(L_FASTA, &l_records)?;
        self.write_fasta(S_FASTA, &s_records)?;
        self.write_fasta(UNKNOWN_FASTA, &unknown_records)?;
        self.write_unknown_headers(&unknown_records)?;

        Ok(WrittenCounts {
            l: l_records.len(),
            s: s_records.len(),
            unknown: unknown_records.len(),
        })
    }

    fn write_fasta(&self, name: &str, records: &[&Record]) -> Result<(), LassaError> {
        let mut body = String::new();
        for record in records {
            let identifier = metadata::build_identifier(&record.accession, record.qualifiers());
            body.push('>');
            body.push_str(&identifier);
            body.push('\n');
            let sequence = record.sequence().as_bytes();
            for chunk in sequence.chunks(FASTA_WIDTH) {
                body.push_str(&String::from_utf8_lossy(chunk));
                body.push('\n');
            }
        }
        self.write_atomic(name, body.as_bytes())
    }

    fn write_unknown_headers(&self, records: &[&Record]) -> Result<(), LassaError> {
        let mut body = String::new();
        for record in records {
            body.push('>');
            body.push_str(&record.accession);
            body.push(' ');
            body.push_str(record.original_header());
            body.push('\n');
        }
        self.write_atomic(UNKNOWN_HEADERS, body.as_bytes())
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<(), LassaError> {
        write_atomic(&self.outdir, name, bytes)
    }
}

pub fn write_atomic(outdir: &Utf8Path, name: &str, bytes: &[u8]) -> Result<(), LassaError> {
    let mut temp = tempfile::NamedTempFile::new_in(outdir.as_std_path())
        .map_err(|err| LassaError::Filesystem(err.to_string()))?;
    temp.write_all(bytes)
        .map_err(|err| LassaError::Filesystem(err.to_string()))?;
    temp.persist(outdir.join(name).as_std_path())
        .map_err(|err| LassaError::Filesystem(err.to_string()))?;
    Ok(())
}
