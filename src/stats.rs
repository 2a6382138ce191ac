use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Record, Segment};
use crate::filter;
use crate::metadata::{self, UNKNOWN_LOC};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentTally {
    pub l: usize,
    pub s: usize,
    pub unknown: usize,
}

impl SegmentTally {
    pub fn total(&self) -> usize {
        self.l + self.s + self.unknown
    }

    fn bump(&mut self, segment: Segment) {
        match segment {
            Segment::L => self.l += 1,
            Segment::S => self.s += 1,
            Segment::Unknown => self.unknown += 1,
        }
    }
}

/// Immutable snapshot of one collection: totals by segment, by canonical
/// country, and by host category. Computed on demand, never mutated after.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageStatistics {
    pub total: usize,
    pub segments: SegmentTally,
    pub by_country: BTreeMap<String, SegmentTally>,
    pub by_host: BTreeMap<&'static str, usize>,
}

/// Tally a collection snapshot. Segment verdicts are the frozen per-record
/// values assigned at ingestion, so the result is independent of any later
/// description rewriting. Works on empty collections.
pub fn aggregate(collection: &[Record]) -> StageStatistics {
    let mut stats = StageStatistics::default();
    for record in collection {
        stats.total += 1;
        stats.segments.bump(record.segment());

        let country = record
            .geo_loc()
            .map(metadata::location_token)
            .unwrap_or_else(|| UNKNOWN_LOC.to_string());
        stats.by_country.entry(country).or_default().bump(record.segment());

        let host = filter::host_category(record).label();
        *stats.by_host.entry(host).or_insert(0) += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::RawRecord;

    fn record(accession: &str, segment: Segment, qualifiers: &[(&str, &str)]) -> Record {
        let raw = RawRecord {
            accession: accession.to_string(),
            description: String::new(),
            qualifiers: qualifiers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            sequence: String::new(),
        };
        Record::tagged(raw, segment)
    }

    #[test]
    fn empty_collection() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.segments, SegmentTally::default());
        assert!(stats.by_country.is_empty());
    }

    #[test]
    fn tallies_by_segment_country_and_host() {
        let input = vec![
            record(
                "A.1",
                Segment::L,
                &[("geo_loc_name", "Nigeria: Borno"), ("host", "Homo sapiens")],
            ),
            record(
                "B.1",
                Segment::S,
                &[("geo_loc_name", "Sierra Leone"), ("host", "Mastomys natalensis")],
            ),
            record("C.1", Segment::Unknown, &[("geo_loc_name", "missing")]),
        ];

        let stats = aggregate(&input);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.segments.l, 1);
        assert_eq!(stats.segments.s, 1);
        assert_eq!(stats.segments.unknown, 1);

        assert_eq!(stats.by_country.get("Nigeria").map(|t| t.l), Some(1));
        assert_eq!(stats.by_country.get("SierraLeone").map(|t| t.s), Some(1));
        assert_eq!(stats.by_country.get(UNKNOWN_LOC).map(|t| t.unknown), Some(1));

        assert_eq!(stats.by_host.get("human"), Some(&1));
        assert_eq!(stats.by_host.get("rodent"), Some(&1));
        assert_eq!(stats.by_host.get("unknown"), Some(&1));
    }
}
