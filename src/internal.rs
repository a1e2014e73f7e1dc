// Utility functions for tests.

use crate::{Alignment, EditKind, Edge, Graph, Node, NodeSequences, Position};
use crate::traceback::{NodeCigar, RawTraceback};
use crate::utils;

use rand::Rng;

//-----------------------------------------------------------------------------

// Graphs.

// Loads a GFA graph from the test data.
pub(crate) fn load_graph(filename: &'static str) -> Graph {
    let gfa_file = utils::get_test_data(filename);
    let graph = Graph::load_gfa(&gfa_file);
    assert!(graph.is_ok(), "Failed to load graph from {}: {}", gfa_file.display(), graph.unwrap_err());
    graph.unwrap()
}

// The graph in `small.gfa`.
pub(crate) fn small_graph() -> Graph {
    load_graph("small.gfa")
}

// A linear graph with nodes 1..=n.
pub(crate) fn linear_graph(sequences: &[&[u8]]) -> Graph {
    let nodes: Vec<Node> = sequences.iter().enumerate().map(|(i, seq)| Node::new(i + 1, seq)).collect();
    let edges: Vec<Edge> = (1..sequences.len()).map(|id| Edge::new(id, id + 1)).collect();
    let graph = Graph::new(nodes, edges);
    assert!(graph.is_ok(), "Failed to create a linear graph: {}", graph.unwrap_err());
    graph.unwrap()
}

pub(crate) fn random_sequence<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    (0..len).map(|_| BASES[rng.gen_range(0..BASES.len())]).collect()
}

// A random DAG with nodes 1..=node_count where edges go from smaller to larger identifiers.
// Nodes are listed in reverse order so that the input order is not a topological order.
pub(crate) fn random_dag<R: Rng>(rng: &mut R, node_count: usize, max_len: usize) -> Graph {
    let mut nodes: Vec<Node> = Vec::with_capacity(node_count);
    for id in (1..=node_count).rev() {
        let len = rng.gen_range(1..=max_len);
        nodes.push(Node::new(id, &random_sequence(rng, len)));
    }
    let mut edges: Vec<Edge> = Vec::new();
    for from in 1..node_count {
        // Keep the graph connected.
        edges.push(Edge::new(from, from + 1));
        for to in (from + 2)..=node_count {
            if rng.gen_bool(0.2) {
                edges.push(Edge::new(from, to));
            }
        }
    }
    let graph = Graph::new(nodes, edges);
    assert!(graph.is_ok(), "Failed to create a random graph: {}", graph.unwrap_err());
    graph.unwrap()
}

// A random path through a graph created with `random_dag` as a sequence of node identifiers.
pub(crate) fn random_path<R: Rng>(rng: &mut R, graph: &Graph) -> Vec<usize> {
    let mut result = vec![rng.gen_range(1..=graph.node_count())];
    loop {
        let last = result[result.len() - 1];
        let successors: Vec<usize> = graph.edges().iter().filter(|edge| edge.from == last).map(|edge| edge.to).collect();
        if successors.is_empty() || rng.gen_bool(0.3) {
            break;
        }
        result.push(successors[rng.gen_range(0..successors.len())]);
    }
    result
}

//-----------------------------------------------------------------------------

// Tracebacks.

// Builds a traceback from (node identifier, CIGAR string) pairs.
pub(crate) fn create_traceback(score: isize, start: Position, cigars: &[(usize, &[u8])]) -> RawTraceback {
    let mut nodes: Vec<NodeCigar> = Vec::with_capacity(cigars.len());
    for (node_id, cigar) in cigars.iter() {
        let parsed = NodeCigar::parse(*node_id, cigar);
        assert!(parsed.is_ok(), "Failed to parse CIGAR for node {}: {}", node_id, parsed.unwrap_err());
        nodes.push(parsed.unwrap());
    }
    RawTraceback { score, secondary_score: None, position: start, nodes }
}

//-----------------------------------------------------------------------------

// Alignments.

// Checks the structural properties of an alignment without soft clips:
//
// * The path follows the edges of the graph.
// * The mappings start at the path position and then at offset 0.
// * The edits stay within the nodes and cover the entire query.
// * Matches cover identical bases and substitutions cover different bases, ignoring case.
// * Insertions contain the corresponding query bases.
pub(crate) fn check_alignment(alignment: &Alignment, graph: &Graph, query: &[u8], name: &str) {
    assert_eq!(alignment.sequence, query, "[{}]: Wrong query sequence", name);
    assert!(!alignment.is_unaligned(), "[{}]: Empty path", name);
    let node_ids = alignment.path.node_ids();
    for pair in node_ids.windows(2) {
        assert!(graph.edges().contains(&Edge::new(pair[0], pair[1])), "[{}]: No edge from {} to {}", name, pair[0], pair[1]);
    }

    let mut to_pos = 0;
    for (i, mapping) in alignment.path.mappings.iter().enumerate() {
        let reference = graph.node_sequence(mapping.node_id());
        assert!(reference.is_some(), "[{}]: Mapping {} to unknown node {}", name, i, mapping.node_id());
        let reference = reference.unwrap();
        let expected_offset = if i == 0 { alignment.path.position.offset } else { 0 };
        assert_eq!(mapping.position.offset, expected_offset, "[{}]: Wrong offset for mapping {}", name, i);
        let mut from_pos = mapping.position.offset;
        for (j, edit) in mapping.edits.iter().enumerate() {
            assert!(from_pos + edit.from_length() <= reference.len(), "[{}]: Edit {} of mapping {} extends past the node", name, j, i);
            assert!(to_pos + edit.to_length() <= query.len(), "[{}]: Edit {} of mapping {} extends past the query", name, j, i);
            match edit.kind() {
                EditKind::Match => {
                    let len = edit.from_length();
                    assert!(reference[from_pos..from_pos + len].eq_ignore_ascii_case(&query[to_pos..to_pos + len]), "[{}]: Match {} of mapping {} covers different bases", name, j, i);
                },
                EditKind::Substitution => {
                    assert!(!reference[from_pos].eq_ignore_ascii_case(&query[to_pos]), "[{}]: Substitution {} of mapping {} covers identical bases", name, j, i);
                    assert_eq!(edit.sequence(), Some(&query[to_pos..to_pos + 1]), "[{}]: Wrong base in substitution {} of mapping {}", name, j, i);
                },
                EditKind::Insertion => {
                    assert_eq!(edit.sequence(), Some(&query[to_pos..to_pos + edit.to_length()]), "[{}]: Wrong sequence in insertion {} of mapping {}", name, j, i);
                },
                EditKind::Deletion => {},
                EditKind::SoftClip => panic!("[{}]: Unexpected soft clip {} in mapping {}", name, j, i),
            }
            from_pos += edit.from_length();
            to_pos += edit.to_length();
        }
    }
    assert_eq!(to_pos, query.len(), "[{}]: The alignment does not cover the query", name);
}

// Computes the alignment score from the edits using the given parameters.
pub(crate) fn alignment_score(alignment: &Alignment, match_score: isize, mismatch: isize, gap_open: isize, gap_extension: isize) -> isize {
    let mut score = 0;
    let mut prev_kind: Option<EditKind> = None;
    for edit in alignment.edits() {
        let kind = edit.kind();
        match kind {
            EditKind::Match => score += match_score * edit.from_length() as isize,
            EditKind::Substitution => score -= mismatch,
            EditKind::Insertion | EditKind::Deletion => {
                let len = if kind == EditKind::Insertion { edit.to_length() } else { edit.from_length() } as isize;
                // Gaps split at node boundaries continue the same gap.
                if prev_kind == Some(kind) {
                    score -= gap_extension * len;
                } else {
                    score -= gap_open + gap_extension * (len - 1);
                }
            },
            EditKind::SoftClip => {},
        }
        prev_kind = Some(kind);
    }
    score
}

//-----------------------------------------------------------------------------
