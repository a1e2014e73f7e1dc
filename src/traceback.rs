//! Raw tracebacks reported by an aligner.
//!
//! A [`RawTraceback`] describes the best alignment found by an [`crate::Aligner`] as a sequence of [`NodeCigar`] objects, one for each node visited by the alignment in traversal order.
//! Each node has its own CIGAR string, which is stored as a vector of [`CigarElement`] values.
//! The traceback is an owned copy of the aligner's result and does not depend on the aligner after it has been created.
//!
//! Operation kinds are stored as the bytes reported by the aligner.
//! The supported kinds are `M`, `I`, `D`, and `S` (see [`CigarOp`]).
//! Other kinds can be stored but not translated into an alignment.
//!
//! # Examples
//!
//! ```
//! use graph_aligner::traceback::{CigarElement, CigarOp, NodeCigar};
//!
//! let cigar = NodeCigar::parse(12, b"3M1I2M").unwrap();
//! assert_eq!(cigar.node_id, 12);
//! assert_eq!(cigar.elements, vec![
//!     CigarElement::new(CigarOp::Match, 3),
//!     CigarElement::new(CigarOp::Insertion, 1),
//!     CigarElement::new(CigarOp::Match, 2),
//! ]);
//! assert_eq!(cigar.to_bytes(), b"3M1I2M");
//! ```

use crate::graph::Position;
use crate::utils;


//-----------------------------------------------------------------------------

/// A supported CIGAR operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CigarOp {
    /// Aligned bases that may be matches or mismatches (`M`).
    Match,
    /// Bases present only in the query (`I`).
    Insertion,
    /// Bases present only in the reference (`D`).
    Deletion,
    /// Query bases excluded from the alignment (`S`).
    SoftClip,
}

impl CigarOp {
    /// Returns the operation corresponding to the CIGAR symbol, or [`None`] if the symbol is not supported.
    pub fn from_byte(symbol: u8) -> Option<Self> {
        match symbol {
            b'M' => Some(CigarOp::Match),
            b'I' => Some(CigarOp::Insertion),
            b'D' => Some(CigarOp::Deletion),
            b'S' => Some(CigarOp::SoftClip),
            _ => None,
        }
    }

    /// Returns the CIGAR symbol for the operation.
    pub fn to_byte(self) -> u8 {
        match self {
            CigarOp::Match => b'M',
            CigarOp::Insertion => b'I',
            CigarOp::Deletion => b'D',
            CigarOp::SoftClip => b'S',
        }
    }
}

//-----------------------------------------------------------------------------

/// A run of a single operation in a CIGAR string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CigarElement {
    /// Operation kind as reported by the aligner.
    pub kind: u8,
    /// Length of the run.
    pub len: usize,
}

impl CigarElement {
    /// Creates a new element with a supported operation.
    pub fn new(op: CigarOp, len: usize) -> Self {
        CigarElement { kind: op.to_byte(), len }
    }

    /// Returns the operation, or [`None`] if the kind is not supported.
    #[inline]
    pub fn op(&self) -> Option<CigarOp> {
        CigarOp::from_byte(self.kind)
    }
}

//-----------------------------------------------------------------------------

/// The CIGAR string for a single node in a [`RawTraceback`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeCigar {
    /// Identifier of the node.
    pub node_id: usize,
    /// Operations in the node.
    pub elements: Vec<CigarElement>,
}

impl NodeCigar {
    /// Creates a new node CIGAR.
    pub fn new(node_id: usize, elements: Vec<CigarElement>) -> Self {
        NodeCigar { node_id, elements }
    }

    /// Parses a CIGAR string such as `12M1D3M` for the given node.
    ///
    /// Any non-digit byte is accepted as an operation kind.
    /// Returns an error if a run has no length, a run has length 0, or the string ends with a length.
    pub fn parse(node_id: usize, cigar: &[u8]) -> Result<Self, String> {
        let mut elements: Vec<CigarElement> = Vec::new();
        let mut start = 0;
        while start < cigar.len() {
            let digits = cigar[start..].iter().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return Err(format!("Missing run length in CIGAR string {}", String::from_utf8_lossy(cigar)));
            }
            let end = start + digits;
            if end >= cigar.len() {
                return Err(format!("Missing operation at the end of CIGAR string {}", String::from_utf8_lossy(cigar)));
            }
            let len = utils::parse_usize(&cigar[start..end], "run length")?;
            if len == 0 {
                return Err(format!("Empty run in CIGAR string {}", String::from_utf8_lossy(cigar)));
            }
            elements.push(CigarElement { kind: cigar[end], len });
            start = end + 1;
        }
        Ok(NodeCigar { node_id, elements })
    }

    /// Returns the CIGAR string as `Vec<u8>`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();
        for element in self.elements.iter() {
            utils::append_usize(&mut result, element.len);
            result.push(element.kind);
        }
        result
    }

    /// Returns the number of query bases covered by the operations.
    ///
    /// Soft-clipped bases are included.
    /// Unsupported operations are ignored.
    pub fn query_len(&self) -> usize {
        self.elements.iter().filter(|element| {
            matches!(element.op(), Some(CigarOp::Match) | Some(CigarOp::Insertion) | Some(CigarOp::SoftClip))
        }).map(|element| element.len).sum()
    }

    /// Returns the number of reference bases covered by match and deletion operations.
    pub fn reference_len(&self) -> usize {
        self.elements.iter().filter(|element| {
            matches!(element.op(), Some(CigarOp::Match) | Some(CigarOp::Deletion))
        }).map(|element| element.len).sum()
    }
}

//-----------------------------------------------------------------------------

/// The best alignment found by an aligner as per-node CIGAR strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTraceback {
    /// Alignment score.
    pub score: isize,
    /// Score of the best alignment that does not end near the best one, if any.
    pub secondary_score: Option<isize>,
    /// Position of the first aligned reference base.
    pub position: Position,
    /// CIGAR strings for the visited nodes in traversal order.
    pub nodes: Vec<NodeCigar>,
}

impl RawTraceback {
    /// Returns the number of query bases covered by the traceback.
    pub fn query_len(&self) -> usize {
        self.nodes.iter().map(|node| node.query_len()).sum()
    }

    /// Returns the node identifiers in traversal order.
    pub fn node_ids(&self) -> Vec<usize> {
        self.nodes.iter().map(|node| node.node_id).collect()
    }
}

//-----------------------------------------------------------------------------
