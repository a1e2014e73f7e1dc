use super::*;

use crate::internal;
use crate::graph::{Graph, Node};

//-----------------------------------------------------------------------------

// An alignment of `ACAGCTTTAGCAGGA` to the small graph with a substitution, a deletion, and an insertion.
// Target: ACA G CATTAG AC  GGA
// Query:  ACA G CTTTAG -C A GGA
fn bubble_alignment() -> Alignment {
    let mut alignment = Alignment::new("read", b"ACAGCTTTAGCAGGA");
    alignment.score = -5;
    alignment.secondary_score = Some(-12);
    alignment.path = Path {
        position: Position::new(1, 4),
        mappings: vec![
            Mapping { position: Position::new(1, 4), edits: vec![Edit::match_run(3)] },
            Mapping { position: Position::new(2, 0), edits: vec![Edit::match_run(1)] },
            Mapping { position: Position::new(4, 0), edits: vec![
                Edit::match_run(1), Edit::substitution(b'T'), Edit::match_run(4),
            ] },
            Mapping { position: Position::new(5, 0), edits: vec![Edit::deletion(1), Edit::match_run(1)] },
            Mapping { position: Position::new(6, 0), edits: vec![Edit::insertion(b"A"), Edit::match_run(3)] },
        ],
    };
    alignment
}

fn check_gaf(alignment: &Alignment, graph: &Graph, truth: &[u8], name: &str) {
    let line = alignment.to_gaf_line(graph);
    assert!(line.is_ok(), "[{}]: Failed to create a GAF line: {}", name, line.unwrap_err());
    let line = line.unwrap();
    assert_eq!(line, truth, "[{}]: Wrong GAF line:\n{}\n{}", name, String::from_utf8_lossy(&line), String::from_utf8_lossy(truth));
}

//-----------------------------------------------------------------------------

// Tests for `Edit`.

#[test]
fn edit_kinds() {
    let edits = [
        (Edit::match_run(5), EditKind::Match, 5, 5, None),
        (Edit::substitution(b'G'), EditKind::Substitution, 1, 1, Some(&b"G"[..])),
        (Edit::deletion(3), EditKind::Deletion, 3, 0, None),
        (Edit::insertion(b"TTA"), EditKind::Insertion, 0, 3, Some(&b"TTA"[..])),
        (Edit::soft_clip(4), EditKind::SoftClip, 0, 4, None),
    ];
    for (edit, kind, from_length, to_length, sequence) in edits.iter() {
        assert_eq!(edit.kind(), *kind, "Wrong kind for {:?}", edit);
        assert_eq!(edit.from_length(), *from_length, "Wrong from_length for {:?}", edit);
        assert_eq!(edit.to_length(), *to_length, "Wrong to_length for {:?}", edit);
        assert_eq!(edit.sequence(), *sequence, "Wrong sequence for {:?}", edit);
    }
}

#[test]
fn edit_differences() {
    assert_eq!(Edit::match_run(5).to_difference(), Some(Difference::Match(5)), "Wrong difference for a match");
    assert_eq!(Edit::substitution(b'G').to_difference(), Some(Difference::Mismatch(b'G')), "Wrong difference for a substitution");
    assert_eq!(Edit::deletion(3).to_difference(), Some(Difference::Deletion(3)), "Wrong difference for a deletion");
    assert_eq!(Edit::insertion(b"TTA").to_difference(), Some(Difference::Insertion(b"TTA".to_vec())), "Wrong difference for an insertion");
    assert_eq!(Edit::soft_clip(4).to_difference(), None, "A soft clip should not have a difference");
}

//-----------------------------------------------------------------------------

// Tests for `Mapping` and `Path`.

#[test]
fn mapping_lengths() {
    let alignment = bubble_alignment();
    let lengths: Vec<(usize, usize)> = alignment.path.mappings.iter().map(|mapping| {
        (mapping.from_length(), mapping.to_length())
    }).collect();
    assert_eq!(lengths, vec![(3, 3), (1, 1), (6, 6), (2, 1), (3, 4)], "Wrong mapping lengths");
    assert_eq!(alignment.path.node_ids(), vec![1, 2, 4, 5, 6], "Wrong node identifiers");
    assert_eq!(alignment.path.mappings[2].node_id(), 4, "Wrong node identifier for a mapping");
    assert!(!alignment.path.is_empty(), "The path should not be empty");
    assert!(Path::default().is_empty(), "The default path should be empty");
}

//-----------------------------------------------------------------------------

// Tests for `Alignment`: statistics.

#[test]
fn unaligned() {
    let alignment = Alignment::new("read", b"GATTACA");
    assert!(alignment.is_unaligned(), "A new alignment should be unaligned");
    assert_eq!(alignment.to_length(), 0, "Wrong query length for an unaligned read");
    assert_eq!(alignment.edit_counts(), (0, 0, 0, 0), "Wrong edit counts for an unaligned read");
    assert!(alignment.identity().is_none(), "An unaligned read should not have identity");
    assert!(alignment.difference().is_empty(), "An unaligned read should not have a difference string");
}

#[test]
fn alignment_statistics() {
    let alignment = bubble_alignment();
    assert!(!alignment.is_unaligned(), "The alignment should not be unaligned");
    assert_eq!(alignment.to_length(), 15, "Wrong query length");
    assert_eq!(alignment.edits().count(), 9, "Wrong number of edits");
    assert_eq!(alignment.edit_counts(), (13, 1, 1, 1), "Wrong edit counts");
    assert_eq!(alignment.identity(), Some(13.0 / 16.0), "Wrong identity");
    assert_eq!(alignment.query_interval(), 0..15, "Wrong query interval");

    let truth = vec![
        Difference::Match(5), Difference::Mismatch(b'T'), Difference::Match(4),
        Difference::Deletion(1), Difference::Match(1), Difference::Insertion(b"A".to_vec()), Difference::Match(3),
    ];
    assert_eq!(alignment.difference(), truth, "Wrong difference string");
}

#[test]
fn soft_clipped_interval() {
    let mut alignment = Alignment::new("read", b"TTGATTACAGG");
    alignment.path = Path {
        position: Position::new(1, 0),
        mappings: vec![
            Mapping { position: Position::new(1, 0), edits: vec![Edit::soft_clip(2), Edit::match_run(4)] },
            Mapping { position: Position::new(2, 0), edits: vec![Edit::match_run(3), Edit::soft_clip(2)] },
        ],
    };
    assert_eq!(alignment.edit_counts(), (7, 0, 0, 0), "Soft clips should not be counted");
    assert_eq!(alignment.difference(), vec![Difference::Match(7)], "Soft clips should not be in the difference string");

    alignment.soft_clip = SoftClipPolicy::AdvanceQuery;
    assert_eq!(alignment.query_interval(), 2..9, "Wrong query interval when soft clips advance the query");

    // Soft clips consumed reference bases, and the query is shorter.
    alignment.soft_clip = SoftClipPolicy::AdvanceReference;
    alignment.sequence = b"GATTACA".to_vec();
    assert_eq!(alignment.query_interval(), 0..7, "Wrong query interval when soft clips advance the reference");
}

//-----------------------------------------------------------------------------

// Tests for `Alignment`: output.

#[test]
fn gaf_output() {
    let graph = internal::small_graph();
    let alignment = bubble_alignment();
    let truth = b"read\t15\t0\t15\t+\t>1>2>4>5>6\t19\t4\t19\t13\t16\t255\tAS:i:-5\ts2:i:-12\tcs:Z::5*AT:4-A:1+A:3";
    check_gaf(&alignment, &graph, truth, "bubble");

    let mut anonymous = alignment.clone();
    anonymous.name = String::new();
    anonymous.secondary_score = None;
    let truth = b"*\t15\t0\t15\t+\t>1>2>4>5>6\t19\t4\t19\t13\t16\t255\tAS:i:-5\tcs:Z::5*AT:4-A:1+A:3";
    check_gaf(&anonymous, &graph, truth, "without a name");
}

#[test]
fn gaf_unaligned() {
    let graph = internal::small_graph();
    let alignment = Alignment::new("read", b"GATTACA");
    check_gaf(&alignment, &graph, b"read\t7\t0\t0\t*\t*\t0\t0\t0\t0\t0\t255", "unaligned");
}

#[test]
fn gaf_errors() {
    let graph = internal::small_graph();
    let mut alignment = bubble_alignment();
    alignment.path.mappings[1].position.node_id = 42;
    assert!(alignment.to_gaf_line(&graph).is_err(), "Wrote a GAF line with a missing node");

    let mut alignment = bubble_alignment();
    alignment.path.mappings[4].edits.push(Edit::match_run(2));
    assert!(alignment.to_gaf_line(&graph).is_err(), "Wrote a GAF line past the end of the path");
}

// The alignment starts with a soft clip of length 2 followed by 4 matches.
// The soft-clipped bases are in the node or in the query, depending on the policy.
fn clipped_alignment(policy: SoftClipPolicy) -> (Graph, Alignment) {
    let (node, query): (&[u8], &[u8]) = match policy {
        SoftClipPolicy::AdvanceReference => (b"TTACGT", b"ACGT"),
        SoftClipPolicy::AdvanceQuery => (b"ACGT", b"TTACGT"),
    };
    let graph = Graph::new(vec![Node::new(1, node)], Vec::new()).unwrap();
    let mut alignment = Alignment::new("", query);
    alignment.score = 4;
    alignment.soft_clip = policy;
    alignment.path = Path {
        position: Position::new(1, 0),
        mappings: vec![
            Mapping { position: Position::new(1, 0), edits: vec![Edit::soft_clip(2), Edit::match_run(4)] },
        ],
    };
    (graph, alignment)
}

#[test]
fn gaf_soft_clips() {
    // The leading soft clip skips the first two bases of the node.
    let (graph, alignment) = clipped_alignment(SoftClipPolicy::AdvanceReference);
    let truth = b"*\t4\t0\t4\t+\t>1\t6\t2\t6\t4\t4\t255\tAS:i:4\tcs:Z::4";
    check_gaf(&alignment, &graph, truth, "soft clip advancing the reference");

    // The leading soft clip skips the first two bases of the query.
    let (graph, alignment) = clipped_alignment(SoftClipPolicy::AdvanceQuery);
    let truth = b"*\t6\t2\t6\t+\t>1\t4\t0\t4\t4\t4\t255\tAS:i:4\tcs:Z::4";
    check_gaf(&alignment, &graph, truth, "soft clip advancing the query");

    // Trailing soft clips do not change the target interval.
    let (graph, mut alignment) = clipped_alignment(SoftClipPolicy::AdvanceReference);
    alignment.sequence = b"TTACGTAA".to_vec();
    alignment.path.mappings[0].edits = vec![Edit::match_run(6), Edit::soft_clip(2)];
    let truth = b"*\t8\t0\t6\t+\t>1\t6\t0\t6\t6\t6\t255\tAS:i:4\tcs:Z::6";
    check_gaf(&alignment, &graph, truth, "trailing soft clip");
}

#[test]
fn gaf_interior_soft_clip() {
    let (graph, mut alignment) = clipped_alignment(SoftClipPolicy::AdvanceReference);
    alignment.sequence = b"TTCGT".to_vec();
    alignment.path.mappings[0].edits = vec![Edit::match_run(2), Edit::soft_clip(1), Edit::match_run(3)];
    assert!(alignment.to_gaf_line(&graph).is_err(), "Wrote a GAF line with a soft clip inside the alignment");
}

#[test]
fn json_output() {
    let mut alignment = Alignment::new("read", b"ACGTT");
    alignment.score = -2;
    alignment.path = Path {
        position: Position::new(3, 1),
        mappings: vec![
            Mapping { position: Position::new(3, 1), edits: vec![Edit::match_run(2), Edit::substitution(b'T')] },
            Mapping { position: Position::new(4, 0), edits: vec![Edit::deletion(1), Edit::insertion(b"T")] },
        ],
    };
    let truth = concat!(
        "{\"name\": \"read\", \"sequence\": \"ACGTT\", \"score\": -2, \"query_position\": 0, \"path\": {\"mapping\": [",
        "{\"position\": {\"node_id\": 3, \"offset\": 1}, \"edit\": [",
        "{\"from_length\": 2, \"to_length\": 2}, {\"from_length\": 1, \"to_length\": 1, \"sequence\": \"T\"}]}, ",
        "{\"position\": {\"node_id\": 4, \"offset\": 0}, \"edit\": [",
        "{\"from_length\": 1, \"to_length\": 0}, {\"from_length\": 0, \"to_length\": 1, \"sequence\": \"T\"}]}",
        "]}}"
    );
    assert_eq!(alignment.to_json().to_string(), truth, "Wrong JSON output");

    alignment.name = String::new();
    alignment.secondary_score = Some(-7);
    let json = alignment.to_json().to_string();
    assert!(json.starts_with("{\"sequence\": \"ACGTT\", \"score\": -2, \"secondary_score\": [-7], "), "Wrong JSON without a name: {}", json);

    // Read names come from FASTA headers and may contain any characters.
    alignment.name = String::from("read\"1\\a");
    let json = alignment.to_json().to_string();
    assert!(json.starts_with("{\"name\": \"read\\\"1\\\\a\", "), "Wrong JSON with special characters in the name: {}", json);
}

//-----------------------------------------------------------------------------
