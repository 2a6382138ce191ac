use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Expected full-length residue counts for the two Lassa virus genome
/// segments, used as completeness denominators.
pub const L_REFERENCE_LENGTH: usize = 7279;
pub const S_REFERENCE_LENGTH: usize = 3402;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    L,
    S,
    Unknown,
}

impl Segment {
    pub fn reference_length(self) -> Option<usize> {
        match self {
            Segment::L => Some(L_REFERENCE_LENGTH),
            Segment::S => Some(S_REFERENCE_LENGTH),
            Segment::Unknown => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::L => write!(f, "L"),
            Segment::S => write!(f, "S"),
            Segment::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One GenBank entry exactly as parsed from an efetch payload, before any
/// classification or normalization.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub accession: String,
    pub description: String,
    pub qualifiers: BTreeMap<String, String>,
    pub sequence: String,
}

/// A retrieved record tagged at ingestion with its segment verdict and the
/// untouched original header text. The verdict and header are frozen then:
/// later pipeline stages and statistics read them back instead of re-deriving
/// them from the (eventually rewritten) description.
#[derive(Debug, Clone)]
pub struct Record {
    pub accession: String,
    pub description: String,
    original_header: String,
    qualifiers: BTreeMap<String, String>,
    sequence: String,
    segment: Segment,
}

impl Record {
    pub fn tagged(raw: RawRecord, segment: Segment) -> Self {
        Self {
            accession: raw.accession,
            original_header: raw.description.clone(),
            description: raw.description,
            qualifiers: raw.qualifiers,
            sequence: raw.sequence,
            segment,
        }
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn original_header(&self) -> &str {
        &self.original_header
    }

    pub fn qualifiers(&self) -> &BTreeMap<String, String> {
        &self.qualifiers
    }

    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers.get(name).map(String::as_str)
    }

    pub fn host(&self) -> Option<&str> {
        self.qualifier("host")
    }

    pub fn geo_loc(&self) -> Option<&str> {
        self.qualifier("geo_loc_name")
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence.len()
    }
}

/// Ordered collection of records; insertion order is retrieval order and is
/// preserved by every filter stage.
pub type SequenceCollection = Vec<Record>;
