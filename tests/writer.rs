use std::collections::BTreeMap;
use std::fs;

use camino::Utf8PathBuf;

use lassaseq::domain::{RawRecord, Record, Segment};
use lassaseq::writer::{
    L_FASTA, S_FASTA, SequenceWriter, UNKNOWN_FASTA, UNKNOWN_HEADERS,
};

fn record(
    accession: &str,
    description: &str,
    segment: Segment,
    sequence: &str,
    qualifiers: &[(&str, &str)],
) -> Record {
    let raw = RawRecord {
        accession: accession.to_string(),
        description: description.to_string(),
        qualifiers: qualifiers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        sequence: sequence.to_string(),
    };
    Record::tagged(raw, segment)
}

#[test]
fn writes_per_segment_files_with_rewritten_headers() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();

    let collection = vec![
        record(
            "L1.1",
            "Lassa virus segment L",
            Segment::L,
            "acgtacgt",
            &[
                ("geo_loc_name", "Sierra Leone: Kenema"),
                ("collection_date", "2013-08-15"),
            ],
        ),
        record(
            "S1.1",
            "nucleoprotein gene",
            Segment::S,
            "ttttgggg",
            &[("geo_loc_name", "Nigeria")],
        ),
        record("U1.1", "unannotated isolate", Segment::Unknown, "aaaa", &[]),
    ];

    let writer = SequenceWriter::new(outdir.clone());
    let written = writer.write_all(&collection).unwrap();
    assert_eq!(written.l, 1);
    assert_eq!(written.s, 1);
    assert_eq!(written.unknown, 1);

    let l_text = fs::read_to_string(outdir.join(L_FASTA).as_std_path()).unwrap();
    assert!(l_text.starts_with(">L1.1_SierraLeone_2013.622\n"));
    assert!(l_text.contains("acgtacgt"));
    // The free-text description never reaches the rewritten header.
    assert!(!l_text.contains("Lassa virus segment L"));

    let s_text = fs::read_to_string(outdir.join(S_FASTA).as_std_path()).unwrap();
    assert!(s_text.starts_with(">S1.1_Nigeria_UnknownDate\n"));

    let u_text = fs::read_to_string(outdir.join(UNKNOWN_FASTA).as_std_path()).unwrap();
    assert!(u_text.starts_with(">U1.1_UnknownLoc_UnknownDate\n"));

    let headers = fs::read_to_string(outdir.join(UNKNOWN_HEADERS).as_std_path()).unwrap();
    assert_eq!(headers, ">U1.1 unannotated isolate\n");
}

#[test]
fn wraps_sequences_at_seventy_columns() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();

    let collection = vec![record(
        "S1.1",
        "nucleoprotein gene",
        Segment::S,
        &"a".repeat(150),
        &[],
    )];
    SequenceWriter::new(outdir.clone())
        .write_all(&collection)
        .unwrap();

    let text = fs::read_to_string(outdir.join(S_FASTA).as_std_path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1].len(), 70);
    assert_eq!(lines[2].len(), 70);
    assert_eq!(lines[3].len(), 10);
}

#[test]
fn empty_collection_still_produces_files() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();

    let written = SequenceWriter::new(outdir.clone()).write_all(&[]).unwrap();
    assert_eq!(written.l + written.s + written.unknown, 0);
    for name in [L_FASTA, S_FASTA, UNKNOWN_FASTA, UNKNOWN_HEADERS] {
        assert!(outdir.join(name).as_std_path().exists());
    }
}
