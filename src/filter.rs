use std::collections::HashSet;

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{Record, SequenceCollection};
use crate::metadata::{self, UNKNOWN_DATE, UNKNOWN_LOC};
use crate::segment::matches_pattern;

pub const COMPLETE_CUTOFF_PERCENT: f64 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GenomeMode {
    Complete,
    MinPercent,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HostMode {
    Human,
    Rodent,
    HumanOrRodent,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataMode {
    Location,
    Date,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostCategory {
    Human,
    Rodent,
    Other,
    Unknown,
}

impl HostCategory {
    pub fn label(self) -> &'static str {
        match self {
            HostCategory::Human => "human",
            HostCategory::Rodent => "rodent",
            HostCategory::Other => "other",
            HostCategory::Unknown => "unknown",
        }
    }
}

const HUMAN_PATTERNS: &[&str] = &[
    "homo sapiens",
    "homo sapien",
    "homosapiens",
    "h. sapiens",
    "human",
];

const RODENT_PATTERNS: &[&str] = &[
    "mastomys",
    "natal multimammate",
    "rattus",
    "praomys",
    "hylomyscus",
    "mus musculus",
    "rodent",
    "mouse",
    "mice",
    "rat",
];

pub fn classify_host(host: &str) -> HostCategory {
    let lowered = host.to_lowercase();
    if HUMAN_PATTERNS
        .iter()
        .any(|pattern| matches_pattern(&lowered, pattern))
    {
        return HostCategory::Human;
    }
    if RODENT_PATTERNS
        .iter()
        .any(|pattern| matches_pattern(&lowered, pattern))
    {
        return HostCategory::Rodent;
    }
    HostCategory::Other
}

pub fn host_category(record: &Record) -> HostCategory {
    record
        .host()
        .map(classify_host)
        .unwrap_or(HostCategory::Unknown)
}

/// Drop records whose accession appears in the exclusion set.
pub fn remove_excluded(collection: &[Record], exclusions: &HashSet<String>) -> SequenceCollection {
    if exclusions.is_empty() {
        return collection.to_vec();
    }
    collection
        .iter()
        .filter(|record| !exclusions.contains(&record.accession))
        .cloned()
        .collect()
}

/// Completeness against the per-segment reference length. Unknown-segment
/// records have no reference and are dropped by every mode except `None`.
pub fn filter_completeness(
    collection: &[Record],
    mode: GenomeMode,
    threshold: Option<f64>,
) -> SequenceCollection {
    let cutoff = match mode {
        GenomeMode::None => return collection.to_vec(),
        GenomeMode::Complete => COMPLETE_CUTOFF_PERCENT,
        GenomeMode::MinPercent => threshold.unwrap_or(COMPLETE_CUTOFF_PERCENT),
    };
    collection
        .iter()
        .filter(|record| match record.segment().reference_length() {
            Some(reference) => {
                (record.sequence_length() as f64 / reference as f64) * 100.0 >= cutoff
            }
            None => false,
        })
        .cloned()
        .collect()
}

/// Records without a host qualifier are excluded by every mode except `None`.
pub fn filter_host(collection: &[Record], mode: HostMode) -> SequenceCollection {
    if matches!(mode, HostMode::None) {
        return collection.to_vec();
    }
    collection
        .iter()
        .filter(|record| match host_category(record) {
            HostCategory::Human => matches!(mode, HostMode::Human | HostMode::HumanOrRodent),
            HostCategory::Rodent => matches!(mode, HostMode::Rodent | HostMode::HumanOrRodent),
            HostCategory::Other | HostCategory::Unknown => false,
        })
        .cloned()
        .collect()
}

/// Keep records whose identifier parts are resolvable, per mode.
pub fn filter_metadata(collection: &[Record], mode: MetadataMode) -> SequenceCollection {
    if matches!(mode, MetadataMode::None) {
        return collection.to_vec();
    }
    collection
        .iter()
        .filter(|record| {
            let (location, date) = metadata::identifier_parts(record.qualifiers());
            match mode {
                MetadataMode::Location => location != UNKNOWN_LOC,
                MetadataMode::Date => date != UNKNOWN_DATE,
                MetadataMode::Both => location != UNKNOWN_LOC && date != UNKNOWN_DATE,
                MetadataMode::None => true,
            }
        })
        .cloned()
        .collect()
}

/// Allow-list of canonical country tokens; `None` passes everything through.
pub fn filter_country(
    collection: &[Record],
    allowed: Option<&HashSet<String>>,
) -> SequenceCollection {
    let Some(allowed) = allowed else {
        return collection.to_vec();
    };
    collection
        .iter()
        .filter(|record| {
            record
                .geo_loc()
                .map(metadata::location_token)
                .is_some_and(|token| allowed.contains(&token))
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub genome_mode: GenomeMode,
    pub completeness_threshold: Option<f64>,
    pub host_mode: HostMode,
    pub metadata_mode: MetadataMode,
    pub countries: Option<HashSet<String>>,
    pub exclusions: HashSet<String>,
}

impl PipelineOptions {
    pub fn passthrough() -> Self {
        Self {
            genome_mode: GenomeMode::None,
            completeness_threshold: None,
            host_mode: HostMode::None,
            metadata_mode: MetadataMode::None,
            countries: None,
            exclusions: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage: &'static str,
    pub collection: SequenceCollection,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub stages: Vec<StageOutput>,
}

impl PipelineRun {
    pub fn final_collection(&self) -> &[Record] {
        self.stages
            .last()
            .map(|stage| stage.collection.as_slice())
            .unwrap_or(&[])
    }
}

/// Run the fixed stage order: exclusion, completeness, host, metadata,
/// country. Each stage consumes the previous stage's output; record order is
/// preserved throughout. With every mode set to `None` and no exclusions the
/// final collection equals the input.
pub fn run_pipeline(input: &[Record], options: &PipelineOptions) -> PipelineRun {
    let excluded = remove_excluded(input, &options.exclusions);
    let complete = filter_completeness(
        &excluded,
        options.genome_mode,
        options.completeness_threshold,
    );
    let hosts = filter_host(&complete, options.host_mode);
    let with_metadata = filter_metadata(&hosts, options.metadata_mode);
    let by_country = filter_country(&with_metadata, options.countries.as_ref());
    PipelineRun {
        stages: vec![
            StageOutput {
                stage: "exclusion",
                collection: excluded,
            },
            StageOutput {
                stage: "completeness",
                collection: complete,
            },
            StageOutput {
                stage: "host",
                collection: hosts,
            },
            StageOutput {
                stage: "metadata",
                collection: with_metadata,
            },
            StageOutput {
                stage: "country",
                collection: by_country,
            },
        ],
    }
}
