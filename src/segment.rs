use crate::domain::{RawRecord, Segment};

/// One classification rule: any pattern hit yields the verdict. Rules are
/// evaluated strictly in declaration order, first match wins.
struct Rule {
    patterns: &'static [&'static str],
    verdict: Segment,
}

const EXPLICIT_RULES: &[Rule] = &[
    Rule {
        patterns: &["segment l", "l segment"],
        verdict: Segment::L,
    },
    Rule {
        patterns: &["segment s", "s segment"],
        verdict: Segment::S,
    },
];

// S-protein vocabulary outranks the L vocabulary: glycoprotein and
// nucleoprotein names are the more reliable annotations in practice.
const KEYWORD_RULES: &[Rule] = &[
    Rule {
        patterns: &[
            "nucleoprotein",
            "glycoprotein",
            "nucleocapsid",
            "gpc",
            "np",
            "gc",
            "gn",
            "g1",
            "g2",
        ],
        verdict: Segment::S,
    },
    Rule {
        patterns: &[
            "polymerase",
            "rna-dependent rna polymerase",
            "rdrp",
            "z protein",
            "zinc-finger protein",
            "matrix protein",
            "l protein",
            "large protein",
        ],
        verdict: Segment::L,
    },
];

/// Classify a record's free-text description into a segment verdict.
///
/// Case-insensitive ordered decision list: explicit "segment l"/"l segment"
/// phrases, then protein-name vocabularies. When nothing matches and the
/// original header differs from the description, the same rules are retried
/// against the header. Pure and deterministic for a given pair of strings.
pub fn classify(description: &str, original_header: Option<&str>) -> Segment {
    if let Some(verdict) = classify_text(description) {
        return verdict;
    }
    if let Some(header) = original_header {
        if header != description {
            if let Some(verdict) = classify_text(header) {
                return verdict;
            }
        }
    }
    Segment::Unknown
}

/// Ingestion-time verdict for a freshly parsed record. A `segment` source
/// qualifier of exactly `L` or `S` is authoritative; the textual heuristics
/// only run when the archive did not annotate the segment.
pub fn classify_record(raw: &RawRecord) -> Segment {
    if let Some(value) = raw.qualifiers.get("segment") {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => return Segment::L,
            "S" => return Segment::S,
            _ => {}
        }
    }
    classify(&raw.description, None)
}

fn classify_text(text: &str) -> Option<Segment> {
    let lowered = text.to_lowercase();
    for rule in EXPLICIT_RULES.iter().chain(KEYWORD_RULES.iter()) {
        if rule
            .patterns
            .iter()
            .any(|pattern| matches_pattern(&lowered, pattern))
        {
            return Some(rule.verdict);
        }
    }
    None
}

/// Short abbreviations (NP, GC, G1, ...) must match a whole token or they
/// would fire inside unrelated words; longer patterns match as substrings.
/// Expects `text` to be lowercased already.
pub(crate) fn matches_pattern(text: &str, pattern: &str) -> bool {
    if pattern.len() <= 3 && !pattern.contains(' ') {
        text.split(|ch: char| !ch.is_ascii_alphanumeric())
            .any(|token| token == pattern)
    } else {
        text.contains(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_phrase_beats_keywords() {
        let verdict = classify("Lassa virus Segment L nucleoprotein gene", None);
        assert_eq!(verdict, Segment::L);
    }

    #[test]
    fn explicit_phrases_any_case() {
        assert_eq!(classify("lassa SEGMENT S, complete sequence", None), Segment::S);
        assert_eq!(classify("Lassa virus L segment", None), Segment::L);
    }

    #[test]
    fn s_vocabulary() {
        assert_eq!(classify("nucleoprotein (NP) gene", None), Segment::S);
        assert_eq!(classify("glycoprotein precursor GPC mRNA", None), Segment::S);
        assert_eq!(classify("G2 gene, partial cds", None), Segment::S);
    }

    #[test]
    fn l_vocabulary() {
        assert_eq!(classify("RNA-dependent RNA polymerase gene", None), Segment::L);
        assert_eq!(classify("Z protein mRNA, complete cds", None), Segment::L);
        assert_eq!(classify("large protein gene", None), Segment::L);
    }

    #[test]
    fn short_keywords_require_whole_tokens() {
        // "np" inside "snp" must not classify.
        assert_eq!(classify("strain with SNP panel data", None), Segment::Unknown);
        assert_eq!(classify("NP gene, partial cds", None), Segment::S);
    }

    #[test]
    fn header_fallback_only_when_description_misses() {
        let verdict = classify("", Some("Lassa virus polymerase gene"));
        assert_eq!(verdict, Segment::L);
        // Identical header adds nothing.
        assert_eq!(classify("no signal", Some("no signal")), Segment::Unknown);
    }

    #[test]
    fn unknown_without_signal() {
        assert_eq!(classify("Lassa virus isolate, partial genome", None), Segment::Unknown);
    }

    #[test]
    fn qualifier_is_authoritative() {
        let mut raw = RawRecord {
            accession: "AB12345.1".to_string(),
            description: "nucleoprotein gene".to_string(),
            ..Default::default()
        };
        raw.qualifiers
            .insert("segment".to_string(), "L".to_string());
        assert_eq!(classify_record(&raw), Segment::L);
    }

    #[test]
    fn qualifier_other_values_fall_through() {
        let mut raw = RawRecord {
            accession: "AB12345.1".to_string(),
            description: "nucleoprotein gene".to_string(),
            ..Default::default()
        };
        raw.qualifiers
            .insert("segment".to_string(), "M".to_string());
        assert_eq!(classify_record(&raw), Segment::S);
    }
}
