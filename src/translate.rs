//! Translation of raw tracebacks into alignments.
//!
//! [`translate`] turns a [`RawTraceback`] into an [`Alignment`] with one [`Mapping`] for each visited node.
//! Each CIGAR run becomes one or more [`Edit`] operations:
//!
//! * `M`: The run is split into maximal matching stretches and single-base substitutions by comparing the reference and the query base by base.
//! * `D`: A deletion of the run length.
//! * `I`: An insertion containing the query bases of the run.
//! * `S`: A soft clip of the run length. See [`SoftClipPolicy`] for its effect on the cursors.
//!
//! The translation maintains a reference cursor within the current node and a query cursor over the entire query.
//! The reference cursor starts from the offset of the traceback position in the first node and from 0 in every other node.
//! Bases are compared case-insensitively, as in the aligner, and substitutions store the query base as it is.
//! Only matches and deletions read reference bases, and only matches and insertions read query bases.
//! Bounds are checked for these operations, while soft clips only move the cursors.
//!
//! # Examples
//!
//! ```
//! use graph_aligner::{translate, Edit, Graph, Node, Position, SoftClipPolicy};
//! use graph_aligner::traceback::{NodeCigar, RawTraceback};
//!
//! let graph = Graph::new(vec![Node::new(1, b"ACGT")], Vec::new()).unwrap();
//! let traceback = RawTraceback {
//!     score: -1,
//!     secondary_score: None,
//!     position: Position::new(1, 0),
//!     nodes: vec![NodeCigar::parse(1, b"4M").unwrap()],
//! };
//! let alignment = translate(&traceback, b"ACGA", &graph, SoftClipPolicy::default()).unwrap();
//! assert_eq!(alignment.path.mappings[0].edits, vec![Edit::match_run(3), Edit::substitution(b'A')]);
//! ```

use crate::alignment::{Alignment, Edit, Mapping, Path};
use crate::graph::{NodeSequences, Position};

pub use crate::alignment::SoftClipPolicy;
use crate::traceback::{CigarOp, RawTraceback};

use std::error::Error;
use std::fmt;


//-----------------------------------------------------------------------------

/// An error in translating a raw traceback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationError {
    /// The traceback contains an operation kind other than `M`, `I`, `D`, or `S`.
    UnsupportedOperation {
        /// Node identifier.
        node_id: usize,
        /// Operation kind as reported by the aligner.
        kind: u8,
    },
    /// The traceback visits a node that does not exist.
    UnknownNode(usize),
    /// An operation extends past the end of the node sequence.
    ReferenceOutOfBounds {
        /// Node identifier.
        node_id: usize,
        /// End of the operation in the node.
        end: usize,
        /// Length of the node sequence.
        len: usize,
    },
    /// An operation extends past the end of the query sequence.
    QueryOutOfBounds {
        /// Node identifier.
        node_id: usize,
        /// End of the operation in the query.
        end: usize,
        /// Length of the query sequence.
        len: usize,
    },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::UnsupportedOperation { node_id, kind } => {
                write!(f, "Unsupported CIGAR operation type {} in node {}", char::from(*kind), node_id)
            },
            TranslationError::UnknownNode(node_id) => {
                write!(f, "Traceback visits unknown node {}", node_id)
            },
            TranslationError::ReferenceOutOfBounds { node_id, end, len } => {
                write!(f, "Operation in node {} ends at {} past the node length {}", node_id, end, len)
            },
            TranslationError::QueryOutOfBounds { node_id, end, len } => {
                write!(f, "Operation in node {} ends at query offset {} past the query length {}", node_id, end, len)
            },
        }
    }
}

impl Error for TranslationError {}

//-----------------------------------------------------------------------------

// Appends the edits for a match run with maximal matches and single-base substitutions.
fn split_match(reference: &[u8], query: &[u8], edits: &mut Vec<Edit>) {
    let mut run = 0;
    for (r, q) in reference.iter().zip(query.iter()) {
        if r.eq_ignore_ascii_case(q) {
            run += 1;
        } else {
            if run > 0 {
                edits.push(Edit::match_run(run));
                run = 0;
            }
            edits.push(Edit::substitution(*q));
        }
    }
    if run > 0 {
        edits.push(Edit::match_run(run));
    }
}

// Returns the end of the interval `[start, start + len)` if it fits in `limit`.
fn checked_end(start: usize, len: usize, limit: usize) -> Result<usize, usize> {
    match start.checked_add(len) {
        Some(end) if end <= limit => Ok(end),
        Some(end) => Err(end),
        None => Err(usize::MAX),
    }
}

/// Translates a raw traceback into an alignment.
///
/// The alignment has an empty name, the given query as its sequence, and the score and the secondary score of the traceback.
/// The path starts at the traceback position, and there is one mapping for each node in the traceback.
/// Node sequences are taken from `nodes`.
///
/// Returns an error if an operation is not supported, a node does not exist, or an operation extends past the end of the node or the query.
pub fn translate<G: NodeSequences + ?Sized>(
    traceback: &RawTraceback, query: &[u8], nodes: &G, policy: SoftClipPolicy
) -> Result<Alignment, TranslationError> {
    let mut mappings: Vec<Mapping> = Vec::with_capacity(traceback.nodes.len());
    let mut to_pos = 0;
    for (i, cigar) in traceback.nodes.iter().enumerate() {
        let reference = nodes.node_sequence(cigar.node_id).ok_or(TranslationError::UnknownNode(cigar.node_id))?;
        let mut from_pos = if i == 0 { traceback.position.offset } else { 0 };
        let mut mapping = Mapping::new(Position::new(cigar.node_id, from_pos));

        for element in cigar.elements.iter() {
            let op = element.op().ok_or(TranslationError::UnsupportedOperation {
                node_id: cigar.node_id, kind: element.kind,
            })?;
            let len = element.len;
            let reads_reference = matches!(op, CigarOp::Match | CigarOp::Deletion);
            let reads_query = matches!(op, CigarOp::Match | CigarOp::Insertion);
            if reads_reference {
                checked_end(from_pos, len, reference.len()).map_err(|end| TranslationError::ReferenceOutOfBounds {
                    node_id: cigar.node_id, end, len: reference.len(),
                })?;
            }
            if reads_query {
                checked_end(to_pos, len, query.len()).map_err(|end| TranslationError::QueryOutOfBounds {
                    node_id: cigar.node_id, end, len: query.len(),
                })?;
            }

            match op {
                CigarOp::Match => {
                    split_match(&reference[from_pos..from_pos + len], &query[to_pos..to_pos + len], &mut mapping.edits);
                },
                CigarOp::Deletion => mapping.edits.push(Edit::deletion(len)),
                CigarOp::Insertion => mapping.edits.push(Edit::insertion(&query[to_pos..to_pos + len])),
                CigarOp::SoftClip => mapping.edits.push(Edit::soft_clip(len)),
            }
            let (from_len, to_len) = match (op, policy) {
                (CigarOp::Match, _) => (len, len),
                (CigarOp::Deletion, _) | (CigarOp::SoftClip, SoftClipPolicy::AdvanceReference) => (len, 0),
                (CigarOp::Insertion, _) | (CigarOp::SoftClip, SoftClipPolicy::AdvanceQuery) => (0, len),
            };
            // A soft clip may move a cursor past the end, but the next operation that reads bases fails the bounds check.
            from_pos = from_pos.saturating_add(from_len);
            to_pos = to_pos.saturating_add(to_len);
        }
        mappings.push(mapping);
    }

    Ok(Alignment {
        name: String::new(),
        sequence: query.to_vec(),
        score: traceback.score,
        secondary_score: traceback.secondary_score,
        query_position: 0,
        path: Path { position: traceback.position, mappings },
        soft_clip: policy,
    })
}

//-----------------------------------------------------------------------------
