//! A scalar affine-gap aligner for directed acyclic graphs.
//!
//! The aligner computes a semi-global alignment: the entire query is aligned, while the alignment may start and end anywhere in the graph.
//! There are three dynamic programming matrices over (graph base, query prefix) pairs:
//!
//! * `H`: best score for any alignment ending at the cell.
//! * `E`: best score for an alignment ending with an insertion.
//! * `F`: best score for an alignment ending with a deletion.
//!
//! Graph bases are processed in topological order.
//! The predecessors of the first base of a node are the last bases of its predecessor nodes, while the predecessor of any other base is the previous base in the same node.
//! An alignment may start at any graph base with a match or a mismatch, possibly preceded by an insertion.

use crate::aligner::{AlignableGraph, Aligner, FillParams, ScoringParams};
use crate::graph::Position;
use crate::traceback::{CigarElement, CigarOp, NodeCigar, RawTraceback};

//-----------------------------------------------------------------------------

// Unreachable cells. Gaps never go below this value.
const NEG_INF: i32 = i32::MIN / 2;

fn gap(score: i32, penalty: i32) -> i32 {
    if score <= NEG_INF { NEG_INF } else { (score - penalty).max(NEG_INF) }
}

// Score for aligning the first `len` query bases as an insertion before the graph.
fn leading_insertion(len: usize, gap_open: i32, gap_extension: i32) -> i32 {
    if len == 0 { 0 } else { -(gap_open + (len as i32 - 1) * gap_extension) }
}

// Predecessors of a graph base as graph bases.
fn predecessors(graph: &AlignableGraph, rank: usize, offset: usize) -> Vec<usize> {
    if offset > 0 {
        vec![graph.node_start(rank) + offset - 1]
    } else {
        graph.nodes()[rank].predecessors.iter().map(|&pred| graph.node_end(pred) - 1).collect()
    }
}

//-----------------------------------------------------------------------------

/// Dynamic programming state computed by [`ScalarAligner`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreState {
    query_len: usize,
    gap_open: i32,
    gap_extension: i32,
    h: Vec<i32>,
    e: Vec<i32>,
    f: Vec<i32>,
    // (graph base, score) for the reported alignment ends in order of decreasing score.
    ends: Vec<(usize, i32)>,
}

impl ScoreState {
    /// Returns the length of the query.
    #[inline]
    pub fn query_len(&self) -> usize {
        self.query_len
    }

    /// Returns the scores of the reported alignment ends in decreasing order.
    ///
    /// The first score is the best alignment score.
    pub fn end_scores(&self) -> Vec<isize> {
        self.ends.iter().map(|&(_, score)| score as isize).collect()
    }

    #[inline]
    fn index(&self, base: usize, query_prefix: usize) -> usize {
        base * (self.query_len + 1) + query_prefix
    }
}

//-----------------------------------------------------------------------------

/// A scalar [`Aligner`] for directed acyclic graphs.
///
/// The aligner never reports soft clips.
/// Query bases that cannot be aligned profitably are reported as insertions.
///
/// # Examples
///
/// ```
/// use graph_aligner::aligner::{AlignableGraph, Aligner, ScalarAligner, ScoringParams};
/// use graph_aligner::graph::{Edge, Graph, Node};
///
/// let graph = Graph::new(
///     vec![Node::new(1, b"GAT"), Node::new(2, b"TACA")],
///     vec![Edge::new(1, 2)],
/// ).unwrap();
/// let scoring = ScoringParams::default();
/// let alignable = AlignableGraph::new(&graph, &scoring).unwrap();
///
/// let aligner = ScalarAligner::new();
/// let query = b"ATTAC";
/// let state = aligner.fill(&alignable, query, &scoring.fill_params()).unwrap();
/// let traceback = aligner.traceback(&alignable, &state, query, &scoring).unwrap();
/// assert_eq!(traceback.score, 5);
/// assert_eq!(traceback.node_ids(), vec![1, 2]);
/// assert_eq!(traceback.position.offset, 1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScalarAligner {}

impl ScalarAligner {
    /// Creates a new aligner.
    pub fn new() -> Self {
        ScalarAligner {}
    }

    // Score for ending at (base, query_prefix) with a match or a mismatch.
    fn match_cell(
        graph: &AlignableGraph, state: &ScoreState, preds: &[usize],
        reference: u8, query: &[u8], query_prefix: usize
    ) -> i32 {
        if query_prefix == 0 {
            return NEG_INF;
        }
        let mut best = leading_insertion(query_prefix - 1, state.gap_open, state.gap_extension);
        for &pred in preds.iter() {
            best = best.max(state.h[state.index(pred, query_prefix - 1)]);
        }
        if best <= NEG_INF { NEG_INF } else { best + graph.score(reference, query[query_prefix - 1]) }
    }

    // Chooses the reported alignment ends.
    fn select_ends(graph: &AlignableGraph, state: &ScoreState, params: &FillParams) -> Vec<(usize, i32)> {
        let mut candidates: Vec<(usize, i32)> = (0..graph.sequence_len())
            .map(|base| (base, state.h[state.index(base, state.query_len)]))
            .filter(|&(_, score)| score > NEG_INF)
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut result: Vec<(usize, i32)> = Vec::new();
        let mut accepted: Vec<(usize, usize)> = Vec::new();
        for (base, score) in candidates {
            if result.len() >= params.trace_depth {
                break;
            }
            let (rank, offset) = graph.locate(base);
            let masked = accepted.iter().any(|&(other_rank, other_offset)| {
                other_rank == rank && offset.abs_diff(other_offset) < params.trace_window
            });
            if !masked {
                result.push((base, score));
                accepted.push((rank, offset));
            }
        }
        result
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Matrix {
    H,
    E,
    F,
}

impl Aligner for ScalarAligner {
    type State = ScoreState;

    fn fill(&self, graph: &AlignableGraph, query: &[u8], params: &FillParams) -> Result<Self::State, String> {
        if query.is_empty() {
            return Err(String::from("Cannot align an empty query"));
        }
        if graph.sequence_len() == 0 {
            return Err(String::from("Cannot align to a graph without bases"));
        }
        if params.trace_depth == 0 {
            return Err(String::from("Traceback depth must be positive"));
        }

        let encoded = crate::aligner::encode_sequence(query);
        let cells = graph.sequence_len() * (query.len() + 1);
        let mut state = ScoreState {
            query_len: query.len(),
            gap_open: params.gap_open,
            gap_extension: params.gap_extension,
            h: vec![NEG_INF; cells],
            e: vec![NEG_INF; cells],
            f: vec![NEG_INF; cells],
            ends: Vec::new(),
        };

        for (rank, node) in graph.nodes().iter().enumerate() {
            for (offset, &reference) in node.sequence.iter().enumerate() {
                let base = graph.node_start(rank) + offset;
                let preds = predecessors(graph, rank, offset);
                for query_prefix in 0..=query.len() {
                    let index = state.index(base, query_prefix);

                    let mut f = NEG_INF;
                    for &pred in preds.iter() {
                        let pred_index = state.index(pred, query_prefix);
                        f = f.max(gap(state.h[pred_index], params.gap_open));
                        f = f.max(gap(state.f[pred_index], params.gap_extension));
                    }

                    let e = if query_prefix > 0 {
                        let prev = index - 1;
                        gap(state.h[prev], params.gap_open).max(gap(state.e[prev], params.gap_extension))
                    } else {
                        NEG_INF
                    };

                    let m = Self::match_cell(graph, &state, &preds, reference, &encoded, query_prefix);
                    state.h[index] = m.max(e).max(f);
                    state.e[index] = e;
                    state.f[index] = f;
                }
            }
        }

        state.ends = Self::select_ends(graph, &state, params);
        if state.ends.is_empty() {
            return Err(String::from("No alignment found"));
        }
        Ok(state)
    }

    fn traceback(&self, graph: &AlignableGraph, state: &Self::State, query: &[u8], scoring: &ScoringParams) -> Result<RawTraceback, String> {
        if state.query_len != query.len() {
            return Err(format!("Query length {} does not match the state for length {}", query.len(), state.query_len));
        }
        if state.gap_open != scoring.gap_open || state.gap_extension != scoring.gap_extension {
            return Err(String::from("Gap penalties do not match the state"));
        }
        if state.h.len() != graph.sequence_len() * (query.len() + 1) {
            return Err(String::from("Graph does not match the state"));
        }
        let (end, score) = *state.ends.first().ok_or(String::from("No alignment found"))?;
        let encoded = crate::aligner::encode_sequence(query);

        // (graph base, operation) in reverse order.
        let mut ops: Vec<(usize, CigarOp)> = Vec::new();
        let mut base = end;
        let mut query_prefix = query.len();
        let mut matrix = Matrix::H;
        loop {
            let (rank, offset) = graph.locate(base);
            let preds = predecessors(graph, rank, offset);
            let index = state.index(base, query_prefix);
            match matrix {
                Matrix::H => {
                    let reference = graph.nodes()[rank].sequence[offset];
                    let m = Self::match_cell(graph, state, &preds, reference, &encoded, query_prefix);
                    if m > NEG_INF && state.h[index] == m {
                        ops.push((base, CigarOp::Match));
                        let expected = m - graph.score(reference, encoded[query_prefix - 1]);
                        query_prefix -= 1;
                        match preds.iter().find(|&&pred| state.h[state.index(pred, query_prefix)] == expected) {
                            Some(&pred) => base = pred,
                            None => {
                                // The alignment starts here, possibly after an insertion.
                                if leading_insertion(query_prefix, state.gap_open, state.gap_extension) != expected {
                                    return Err(format!("Traceback failed at graph base {} with query prefix {}", base, query_prefix));
                                }
                                for _ in 0..query_prefix {
                                    ops.push((base, CigarOp::Insertion));
                                }
                                break;
                            }
                        }
                    } else if state.h[index] == state.e[index] && state.e[index] > NEG_INF {
                        matrix = Matrix::E;
                    } else if state.h[index] == state.f[index] && state.f[index] > NEG_INF {
                        matrix = Matrix::F;
                    } else {
                        return Err(format!("Traceback failed at graph base {} with query prefix {}", base, query_prefix));
                    }
                }
                Matrix::E => {
                    ops.push((base, CigarOp::Insertion));
                    let prev = index - 1;
                    matrix = if gap(state.h[prev], state.gap_open) == state.e[index] { Matrix::H } else { Matrix::E };
                    query_prefix -= 1;
                }
                Matrix::F => {
                    ops.push((base, CigarOp::Deletion));
                    let target = state.f[index];
                    let mut next: Option<(usize, Matrix)> = None;
                    for &pred in preds.iter() {
                        let pred_index = state.index(pred, query_prefix);
                        if gap(state.h[pred_index], state.gap_open) == target {
                            next = Some((pred, Matrix::H));
                            break;
                        }
                        if gap(state.f[pred_index], state.gap_extension) == target {
                            next = Some((pred, Matrix::F));
                            break;
                        }
                    }
                    let (pred, pred_matrix) = next.ok_or(
                        format!("Traceback failed in a deletion at graph base {}", base)
                    )?;
                    base = pred;
                    matrix = pred_matrix;
                }
            }
        }
        ops.reverse();

        let (first_rank, first_offset) = graph.locate(ops[0].0);
        let position = Position::new(graph.nodes()[first_rank].id, first_offset);
        let mut nodes: Vec<NodeCigar> = Vec::new();
        let mut prev_rank = usize::MAX;
        for (base, op) in ops {
            let (rank, _) = graph.locate(base);
            if rank != prev_rank {
                nodes.push(NodeCigar::new(graph.nodes()[rank].id, Vec::new()));
                prev_rank = rank;
            }
            // `nodes` is not empty here.
            let Some(cigar) = nodes.last_mut() else { continue; };
            match cigar.elements.last_mut() {
                Some(element) if element.op() == Some(op) => element.len += 1,
                _ => cigar.elements.push(CigarElement::new(op, 1)),
            }
        }

        Ok(RawTraceback {
            score: score as isize,
            secondary_score: state.ends.get(1).map(|&(_, score)| score as isize),
            position,
            nodes,
        })
    }
}

//-----------------------------------------------------------------------------
