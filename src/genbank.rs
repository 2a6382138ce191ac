use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::RawRecord;

static QUALIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([A-Za-z_][A-Za-z0-9_]*)(?:=(.*))?$").expect("valid regex"));

#[derive(Default)]
struct RecordBuilder {
    accession: String,
    fallback_accession: String,
    description: String,
    qualifiers: BTreeMap<String, String>,
    sequence: String,
    in_definition: bool,
    in_source: bool,
    in_origin: bool,
    // Qualifier whose quoted value continues on following lines.
    pending_qualifier: Option<String>,
}

impl RecordBuilder {
    fn finish(mut self) -> Option<RawRecord> {
        if self.accession.is_empty() {
            self.accession = self.fallback_accession;
        }
        if self.accession.is_empty() {
            return None;
        }
        Some(RawRecord {
            accession: self.accession,
            description: self.description,
            qualifiers: self.qualifiers,
            sequence: self.sequence,
        })
    }
}

/// Parse a GenBank flatfile payload (efetch `rettype=gb`) into raw records.
///
/// Extracts the versioned accession, the (possibly multi-line) DEFINITION,
/// the qualifiers of the FEATURES `source` block, and the ORIGIN residues.
/// Tolerant of records missing any of these; records without an accession
/// are dropped. Total: malformed lines are skipped, never an error.
pub fn parse_flatfile(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;

    for line in text.lines() {
        if line.starts_with("LOCUS ") {
            if let Some(builder) = current.take() {
                records.extend(builder.finish());
            }
            current = Some(RecordBuilder::default());
            continue;
        }
        if line.trim_end() == "//" {
            if let Some(builder) = current.take() {
                records.extend(builder.finish());
            }
            continue;
        }
        if let Some(builder) = current.as_mut() {
            consume_line(builder, line);
        }
    }
    if let Some(builder) = current.take() {
        records.extend(builder.finish());
    }
    records
}

fn consume_line(builder: &mut RecordBuilder, line: &str) {
    if builder.in_origin {
        builder
            .sequence
            .extend(line.chars().filter(char::is_ascii_alphabetic));
        return;
    }

    if let Some(rest) = line.strip_prefix("DEFINITION") {
        builder.description = rest.trim().trim_end_matches('.').to_string();
        builder.in_definition = true;
        return;
    }
    if builder.in_definition {
        // Continuation lines are indented to the field-value column.
        if line.starts_with("            ") && !line.trim().is_empty() {
            builder.description.push(' ');
            builder
                .description
                .push_str(line.trim().trim_end_matches('.'));
            return;
        }
        builder.in_definition = false;
    }

    if let Some(rest) = line.strip_prefix("ACCESSION") {
        if let Some(token) = rest.split_whitespace().next() {
            builder.fallback_accession = token.to_string();
        }
        return;
    }
    if let Some(rest) = line.strip_prefix("VERSION") {
        if let Some(token) = rest.split_whitespace().next() {
            builder.accession = token.to_string();
        }
        return;
    }
    if line.starts_with("ORIGIN") {
        builder.in_origin = true;
        builder.in_source = false;
        builder.pending_qualifier = None;
        return;
    }

    // Feature keys sit at column 5, qualifiers at column 21.
    let bytes = line.as_bytes();
    let is_feature_key =
        bytes.len() > 5 && line.starts_with("     ") && bytes[5] != b' ' && bytes[5] != b'/';
    if is_feature_key {
        let key = line.trim().split_whitespace().next().unwrap_or("");
        builder.in_source = key == "source";
        builder.pending_qualifier = None;
        return;
    }

    if !builder.in_source {
        return;
    }
    let trimmed = line.trim();
    if let Some(name) = builder.pending_qualifier.take() {
        let (fragment, closed) = strip_closing_quote(trimmed);
        if let Some(value) = builder.qualifiers.get_mut(&name) {
            value.push(' ');
            value.push_str(fragment);
        }
        if !closed {
            builder.pending_qualifier = Some(name);
        }
        return;
    }
    if let Some(captures) = QUALIFIER_RE.captures(trimmed) {
        let name = captures[1].to_string();
        let raw_value = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        let opened = raw_value.starts_with('"');
        let unquoted = raw_value.trim_start_matches('"');
        let (value, closed) = strip_closing_quote(unquoted);
        builder.qualifiers.insert(name.clone(), value.to_string());
        if opened && !closed {
            builder.pending_qualifier = Some(name);
        }
    }
}

fn strip_closing_quote(fragment: &str) -> (&str, bool) {
    match fragment.strip_suffix('"') {
        Some(stripped) => (stripped, true),
        None => (fragment, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"LOCUS       OQ123456                3402 bp    cRNA    linear   VRL 01-JAN-2024
DEFINITION  Mammarenavirus lassaense isolate Josiah segment S nucleoprotein
            gene, complete cds.
ACCESSION   OQ123456
VERSION     OQ123456.1
FEATURES             Location/Qualifiers
     source          1..3402
                     /organism="Mammarenavirus lassaense"
                     /segment="S"
                     /isolate="Josiah"
                     /host="Homo sapiens"
                     /geo_loc_name="Sierra Leone: Kenema"
                     /collection_date="2013-08-15"
     CDS             55..1764
                     /product="nucleoprotein"
                     /note="this qualifier belongs to another feature and
                     must be ignored"
ORIGIN
        1 gcgcaccggg gatcctaggc attttggttg cgcaattcaa gtgtcctaca acattacacc
       61 atgagtgcat caaaagaaat aaaatcc
//
LOCUS       OQ999999                 100 bp    cRNA    linear   VRL 01-JAN-2024
DEFINITION  Mammarenavirus lassaense partial sequence.
ACCESSION   OQ999999
VERSION     OQ999999.1
FEATURES             Location/Qualifiers
     source          1..100
                     /organism="Mammarenavirus lassaense"
ORIGIN
        1 acgtacgtac
//
"#;

    #[test]
    fn parses_two_records() {
        let records = parse_flatfile(SAMPLE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].accession, "OQ123456.1");
        assert_eq!(records[1].accession, "OQ999999.1");
    }

    #[test]
    fn multiline_definition_joined() {
        let records = parse_flatfile(SAMPLE);
        assert_eq!(
            records[0].description,
            "Mammarenavirus lassaense isolate Josiah segment S nucleoprotein gene, complete cds"
        );
    }

    #[test]
    fn source_qualifiers_extracted() {
        let records = parse_flatfile(SAMPLE);
        let qualifiers = &records[0].qualifiers;
        assert_eq!(qualifiers.get("segment").map(String::as_str), Some("S"));
        assert_eq!(
            qualifiers.get("geo_loc_name").map(String::as_str),
            Some("Sierra Leone: Kenema")
        );
        assert_eq!(
            qualifiers.get("collection_date").map(String::as_str),
            Some("2013-08-15")
        );
        assert_eq!(qualifiers.get("host").map(String::as_str), Some("Homo sapiens"));
        // Qualifiers outside the source block are ignored.
        assert!(!qualifiers.contains_key("product"));
        assert!(!qualifiers.contains_key("note"));
    }

    #[test]
    fn origin_residues_concatenated() {
        let records = parse_flatfile(SAMPLE);
        assert_eq!(records[0].sequence.len(), 87);
        assert!(records[0].sequence.starts_with("gcgcaccggg"));
        assert_eq!(records[1].sequence, "acgtacgtac");
    }

    #[test]
    fn empty_payload() {
        assert!(parse_flatfile("").is_empty());
        assert!(parse_flatfile("no genbank content here\n").is_empty());
    }
}
