//! Difference strings for GAF output.

use crate::utils;

//-----------------------------------------------------------------------------

/// An operation in a difference string describing an alignment between a query sequence and a target sequence.
///
/// The operations are written using the following symbols:
///
/// * `:`: A match given as the match length.
/// * `*`: A mismatch given as the target base and the query base.
/// * `+`: An insertion given as the inserted sequence.
/// * `-`: A deletion given as the deleted sequence.
///
/// The operations do not store target bases, as the query sequence can be reconstructed without that information.
/// Target bases are needed only when writing the difference string.
///
/// # Examples
///
/// ```
/// use graph_aligner::alignment::Difference;
///
/// let ops = vec![
///     Difference::Match(3),
///     Difference::Mismatch(b'A'),
///     Difference::Deletion(2),
///     Difference::Insertion(b"GT".to_vec()),
/// ];
/// let target = b"ACGTCC";
/// assert_eq!(Difference::to_bytes(&ops, target).unwrap(), b":3*TA-CC+GT");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Difference {
    /// A match of the given length.
    Match(usize),
    /// Mismatch represented as the query base.
    Mismatch(u8),
    /// Insertion to the reference represented as the inserted sequence.
    Insertion(Vec<u8>),
    /// Deletion from the reference represented as deletion length.
    Deletion(usize),
}

impl Difference {
    /// Returns (query length, target length, matching bases, edited bases) for the operations.
    ///
    /// Each mismatch is one edited base, while insertions and deletions count all their bases.
    pub fn stats(ops: &[Self]) -> (usize, usize, usize, usize) {
        let mut result = (0, 0, 0, 0);
        for op in ops.iter() {
            result.0 += op.query_len();
            result.1 += op.target_len();
            match op {
                Self::Match(len) => result.2 += len,
                _ => result.3 += op.len(),
            }
        }
        result
    }

    /// Returns the length of the operation.
    ///
    /// This is the target length for matches, mismatches, and deletions and the query length for insertions.
    pub fn len(&self) -> usize {
        match self {
            Self::Insertion(seq) => seq.len(),
            _ => self.target_len(),
        }
    }

    /// Returns `true` if the operation covers no bases.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of target bases covered by the operation.
    pub fn target_len(&self) -> usize {
        match self {
            Self::Match(len) | Self::Deletion(len) => *len,
            Self::Mismatch(_) => 1,
            Self::Insertion(_) => 0,
        }
    }

    /// Returns the number of query bases covered by the operation.
    pub fn query_len(&self) -> usize {
        match self {
            Self::Match(len) => *len,
            Self::Mismatch(_) => 1,
            Self::Insertion(seq) => seq.len(),
            Self::Deletion(_) => 0,
        }
    }

    /// Merges `op` into this operation if both are matches, insertions, or deletions.
    ///
    /// Returns `true` if the operations were merged.
    pub fn try_merge(&mut self, op: &Self) -> bool {
        match (self, op) {
            (Self::Match(len), Self::Match(other)) | (Self::Deletion(len), Self::Deletion(other)) => {
                *len += other;
                true
            },
            (Self::Insertion(seq), Self::Insertion(other)) => {
                seq.extend_from_slice(other);
                true
            },
            _ => false,
        }
    }

    /// Merges adjacent operations of the same type and drops empty operations.
    ///
    /// Mismatches are never merged.
    /// Edits split at node boundaries become single operations.
    pub fn normalize(ops: Vec<Self>) -> Vec<Self> {
        let mut result: Vec<Self> = Vec::with_capacity(ops.len());
        for op in ops.into_iter() {
            if op.is_empty() {
                continue;
            }
            if let Some(last) = result.last_mut() {
                if last.try_merge(&op) {
                    continue;
                }
            }
            result.push(op);
        }
        result
    }

    /// Writes the operations as a `cs` difference string.
    ///
    /// `target` must start at the first aligned target base.
    /// Returns an error if the operations extend past the end of the target.
    pub fn to_bytes(ops: &[Difference], target: &[u8]) -> Result<Vec<u8>, String> {
        let mut result = Vec::new();
        let mut offset = 0;
        for op in ops.iter() {
            let end = offset + op.target_len();
            if end > target.len() {
                return Err(format!("Difference string ends at {} past the target length {}", end, target.len()));
            }
            match op {
                Self::Match(len) => {
                    result.push(b':');
                    utils::append_usize(&mut result, *len);
                },
                Self::Mismatch(base) => result.extend_from_slice(&[b'*', target[offset], *base]),
                Self::Insertion(seq) => {
                    result.push(b'+');
                    result.extend_from_slice(seq);
                },
                Self::Deletion(_) => {
                    result.push(b'-');
                    result.extend_from_slice(&target[offset..end]);
                },
            }
            offset = end;
        }
        Ok(result)
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
