//! The aligner interface and the alignable graph representation.
//!
//! An [`Aligner`] computes the best alignment of a query sequence to an [`AlignableGraph`] in two steps.
//! [`Aligner::fill`] computes the dynamic programming matrices and returns them as an opaque state.
//! [`Aligner::traceback`] recovers the best alignment from the state as a [`RawTraceback`].
//!
//! An [`AlignableGraph`] is built once from a [`Graph`].
//! It stores the nodes in topological order with their sequences encoded using [`NT_TABLE`], the predecessors of each node, and a substitution score matrix derived from [`ScoringParams`].
//!
//! [`ScalarAligner`] is a straightforward implementation of the interface.

use crate::graph::Graph;
use crate::traceback::RawTraceback;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

pub mod scalar;

pub use scalar::{ScalarAligner, ScoreState};


//-----------------------------------------------------------------------------

/// Scoring parameters for alignment.
///
/// All values are non-negative.
/// A match adds `match_score` to the score, while a mismatch subtracts `mismatch`.
/// A gap of length `len` subtracts `gap_open + (len - 1) * gap_extension`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringParams {
    /// Score for a match.
    pub match_score: i32,
    /// Penalty for a mismatch.
    pub mismatch: i32,
    /// Penalty for the first base of a gap.
    pub gap_open: i32,
    /// Penalty for each additional base of a gap.
    pub gap_extension: i32,
}

impl ScoringParams {
    /// Default score for a match.
    pub const DEFAULT_MATCH: i32 = 1;

    /// Default penalty for a mismatch.
    pub const DEFAULT_MISMATCH: i32 = 4;

    /// Default penalty for opening a gap.
    pub const DEFAULT_GAP_OPEN: i32 = 6;

    /// Default penalty for extending a gap.
    pub const DEFAULT_GAP_EXTENSION: i32 = 1;

    /// Creates new scoring parameters.
    ///
    /// Returns an error if the match score is not positive or a penalty is negative.
    pub fn new(match_score: i32, mismatch: i32, gap_open: i32, gap_extension: i32) -> Result<Self, String> {
        if match_score <= 0 {
            return Err(format!("Match score must be positive: {}", match_score));
        }
        if mismatch < 0 || gap_open < 0 || gap_extension < 0 {
            return Err(format!(
                "Penalties must be non-negative: mismatch {}, gap open {}, gap extension {}",
                mismatch, gap_open, gap_extension
            ));
        }
        Ok(ScoringParams { match_score, mismatch, gap_open, gap_extension })
    }

    /// Returns the fill parameters with the default traceback window.
    pub fn fill_params(&self) -> FillParams {
        FillParams {
            gap_open: self.gap_open,
            gap_extension: self.gap_extension,
            trace_window: FillParams::TRACE_WINDOW,
            trace_depth: FillParams::TRACE_DEPTH,
        }
    }

    /// Returns the substitution score matrix for the encoded bases.
    ///
    /// The matrix has [`BASE_CODES`] rows and columns stored in row-major order.
    /// `N` scores 0 against any base.
    pub fn score_matrix(&self) -> Vec<i32> {
        let mut result = vec![0; BASE_CODES * BASE_CODES];
        for i in 0..BASE_CODES - 1 {
            for j in 0..BASE_CODES - 1 {
                result[i * BASE_CODES + j] = if i == j { self.match_score } else { -self.mismatch };
            }
        }
        result
    }
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams {
            match_score: Self::DEFAULT_MATCH,
            mismatch: Self::DEFAULT_MISMATCH,
            gap_open: Self::DEFAULT_GAP_OPEN,
            gap_extension: Self::DEFAULT_GAP_EXTENSION,
        }
    }
}

/// Parameters for [`Aligner::fill`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillParams {
    /// Penalty for the first base of a gap.
    pub gap_open: i32,
    /// Penalty for each additional base of a gap.
    pub gap_extension: i32,
    /// Alignment ends within this many bases of a better end in the same node are not reported.
    pub trace_window: usize,
    /// Maximum number of alignment ends to report.
    pub trace_depth: usize,
}

impl FillParams {
    /// Default traceback window.
    pub const TRACE_WINDOW: usize = 15;

    /// Default traceback depth.
    pub const TRACE_DEPTH: usize = 2;
}

//-----------------------------------------------------------------------------

/// Number of distinct base codes.
pub const BASE_CODES: usize = 5;

/// Code for an unknown base.
pub const UNKNOWN_BASE: u8 = 4;

const fn generate_nt_table() -> [u8; 256] {
    let mut result = [UNKNOWN_BASE; 256];
    result[b'a' as usize] = 0; result[b'A' as usize] = 0;
    result[b'c' as usize] = 1; result[b'C' as usize] = 1;
    result[b'g' as usize] = 2; result[b'G' as usize] = 2;
    result[b't' as usize] = 3; result[b'T' as usize] = 3;
    result
}

/// Base encoding table.
///
/// Bases `acgtACGT` are encoded as values `0..4` and all other bytes as [`UNKNOWN_BASE`].
pub const NT_TABLE: [u8; 256] = generate_nt_table();

/// Encodes a sequence using [`NT_TABLE`].
pub fn encode_sequence(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().map(|&c| NT_TABLE[c as usize]).collect()
}

//-----------------------------------------------------------------------------

/// A node in an [`AlignableGraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignableNode {
    /// Identifier of the node in the original graph.
    pub id: usize,
    /// Encoded sequence.
    pub sequence: Vec<u8>,
    /// Ranks of the predecessor nodes in topological order.
    pub predecessors: Vec<usize>,
}

/// A graph representation for an [`Aligner`].
///
/// Nodes are identified by their ranks in topological order.
/// The bases of the nodes are also identified by their offsets in the concatenation of node sequences in topological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignableGraph {
    nodes: Vec<AlignableNode>,
    // Offset of the first base of each node, with the total length at the end.
    starts: Vec<usize>,
    // Node identifier to rank.
    ranks: HashMap<usize, usize>,
    score_matrix: Vec<i32>,
}

impl AlignableGraph {
    /// Builds an alignable graph with the substitution scores from the given parameters.
    ///
    /// Returns an error if an edge refers to a node that does not exist, if a node has an empty sequence, or if the graph contains a cycle.
    pub fn new(graph: &Graph, scoring: &ScoringParams) -> Result<Self, String> {
        let mut offsets: HashMap<usize, usize> = HashMap::with_capacity(graph.node_count());
        for (offset, node) in graph.nodes().iter().enumerate() {
            if node.is_empty() {
                return Err(format!("Node {} has an empty sequence", node.id));
            }
            offsets.insert(node.id, offset);
        }

        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count()];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count()];
        for edge in graph.edges() {
            let from = *offsets.get(&edge.from).ok_or(
                format!("Edge from {} to {} refers to unknown node {}", edge.from, edge.to, edge.from)
            )?;
            let to = *offsets.get(&edge.to).ok_or(
                format!("Edge from {} to {} refers to unknown node {}", edge.from, edge.to, edge.to)
            )?;
            predecessors[to].push(from);
            successors[from].push(to);
        }

        // Kahn's algorithm with ties broken by the original order.
        let mut in_degree: Vec<usize> = predecessors.iter().map(|preds| preds.len()).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree.iter().enumerate()
            .filter(|(_, &degree)| degree == 0).map(|(offset, _)| Reverse(offset)).collect();
        let mut order: Vec<usize> = Vec::with_capacity(graph.node_count());
        while let Some(Reverse(offset)) = ready.pop() {
            order.push(offset);
            for &next in successors[offset].iter() {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        if order.len() < graph.node_count() {
            return Err(format!(
                "The graph contains a cycle ({} of {} nodes cannot be ordered)",
                graph.node_count() - order.len(), graph.node_count()
            ));
        }

        let mut rank_of_offset = vec![0; graph.node_count()];
        for (rank, &offset) in order.iter().enumerate() {
            rank_of_offset[offset] = rank;
        }

        let mut nodes: Vec<AlignableNode> = Vec::with_capacity(graph.node_count());
        let mut starts: Vec<usize> = Vec::with_capacity(graph.node_count() + 1);
        let mut ranks: HashMap<usize, usize> = HashMap::with_capacity(graph.node_count());
        let mut total = 0;
        for (rank, &offset) in order.iter().enumerate() {
            let node = &graph.nodes()[offset];
            let mut preds: Vec<usize> = predecessors[offset].iter().map(|&pred| rank_of_offset[pred]).collect();
            preds.sort_unstable();
            preds.dedup();
            nodes.push(AlignableNode {
                id: node.id,
                sequence: encode_sequence(&node.sequence),
                predecessors: preds,
            });
            starts.push(total);
            ranks.insert(node.id, rank);
            total += node.len();
        }
        starts.push(total);

        Ok(AlignableGraph {
            nodes,
            starts,
            ranks,
            score_matrix: scoring.score_matrix(),
        })
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total length of the node sequences.
    #[inline]
    pub fn sequence_len(&self) -> usize {
        self.starts[self.nodes.len()]
    }

    /// Returns the nodes in topological order.
    #[inline]
    pub fn nodes(&self) -> &[AlignableNode] {
        &self.nodes
    }

    /// Returns the rank of the node with the given identifier, or [`None`] if there is no such node.
    pub fn rank(&self, id: usize) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    /// Returns the offset of the first base of the node with the given rank.
    #[inline]
    pub fn node_start(&self, rank: usize) -> usize {
        self.starts[rank]
    }

    /// Returns the past-the-end offset of the bases of the node with the given rank.
    #[inline]
    pub fn node_end(&self, rank: usize) -> usize {
        self.starts[rank + 1]
    }

    /// Returns (rank, offset in the node) for the base at the given offset.
    ///
    /// # Panics
    ///
    /// May panic if `base >= self.sequence_len()`.
    pub fn locate(&self, base: usize) -> (usize, usize) {
        // `starts` is strictly increasing, because nodes are not empty.
        let rank = self.starts.partition_point(|&start| start <= base) - 1;
        (rank, base - self.starts[rank])
    }

    /// Returns the substitution score for the encoded bases.
    #[inline]
    pub fn score(&self, reference: u8, query: u8) -> i32 {
        self.score_matrix[reference as usize * BASE_CODES + query as usize]
    }

    /// Returns the substitution score matrix.
    #[inline]
    pub fn score_matrix(&self) -> &[i32] {
        &self.score_matrix
    }
}

//-----------------------------------------------------------------------------

/// A sequence to graph aligner.
///
/// The aligner computes the best alignment in two steps, and the state between the steps belongs to the caller.
/// The graph is never modified, and the same graph can be used for any number of queries.
pub trait Aligner {
    /// Dynamic programming state computed by [`Aligner::fill`].
    type State;

    /// Computes the dynamic programming matrices for aligning the query to the graph.
    ///
    /// Returns an error if the query cannot be aligned.
    fn fill(&self, graph: &AlignableGraph, query: &[u8], params: &FillParams) -> Result<Self::State, String>;

    /// Recovers the best alignment from the state computed by [`Aligner::fill`] for the same graph and query.
    ///
    /// Returns an error if the state does not correspond to the query and the parameters.
    fn traceback(&self, graph: &AlignableGraph, state: &Self::State, query: &[u8], scoring: &ScoringParams) -> Result<RawTraceback, String>;
}

//-----------------------------------------------------------------------------
