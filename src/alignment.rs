//! Structures for representing sequence to graph alignments.
//!
//! An [`Alignment`] object represents the alignment of a query sequence to a path in a graph.
//! The path is a sequence of [`Mapping`] objects, one for each visited node in traversal order.
//! Each mapping describes the alignment to the node as a sequence of [`Edit`] operations.
//!
//! An edit aligns `from_length` reference bases to `to_length` query bases.
//! The shape of the edit determines its kind (see [`EditKind`]):
//!
//! * Match: `from_length == to_length > 0` without a sequence.
//! * Substitution: `from_length == to_length == 1` with the query base as the sequence.
//! * Deletion: `from_length > 0` and `to_length == 0`.
//! * Insertion: `from_length == 0` and `to_length > 0` with the inserted sequence.
//! * Soft clip: `from_length == 0` and `to_length > 0` without a sequence.
//!
//! Alignments can be written as GAF lines with [`Alignment::to_gaf_line`] or as vg-style JSON with [`Alignment::to_json`].

use crate::formats::{self, JSONValue, TypedField};
use crate::graph::{NodeSequences, Position};
use crate::utils;

use std::ops::Range;

pub mod difference;

pub use difference::Difference;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Kind of an [`Edit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Identical bases in the reference and the query.
    Match,
    /// A single reference base replaced with a different query base.
    Substitution,
    /// Reference bases missing from the query.
    Deletion,
    /// Query bases missing from the reference.
    Insertion,
    /// Query bases excluded from the alignment.
    SoftClip,
}

/// How a soft clip moves the reference and query cursors.
///
/// In both cases, the soft clip becomes an edit with `from_length == 0` and `to_length` equal to the run length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SoftClipPolicy {
    /// Advance the reference cursor by the run length and keep the query cursor.
    ///
    /// This is the traditional behavior of graph aligners built on the same traceback format.
    #[default]
    AdvanceReference,
    /// Advance the query cursor by the run length and keep the reference cursor.
    AdvanceQuery,
}

/// An elementary alignment operation within a [`Mapping`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    from_length: usize,
    to_length: usize,
    sequence: Option<Vec<u8>>,
}

impl Edit {
    /// Creates a match of the given length.
    pub fn match_run(len: usize) -> Self {
        Edit { from_length: len, to_length: len, sequence: None }
    }

    /// Creates a substitution with the given query base.
    pub fn substitution(base: u8) -> Self {
        Edit { from_length: 1, to_length: 1, sequence: Some(vec![base]) }
    }

    /// Creates a deletion of the given length.
    pub fn deletion(len: usize) -> Self {
        Edit { from_length: len, to_length: 0, sequence: None }
    }

    /// Creates an insertion of the given query bases.
    pub fn insertion(sequence: &[u8]) -> Self {
        Edit { from_length: 0, to_length: sequence.len(), sequence: Some(sequence.to_vec()) }
    }

    /// Creates a soft clip of the given length.
    pub fn soft_clip(len: usize) -> Self {
        Edit { from_length: 0, to_length: len, sequence: None }
    }

    /// Returns the number of reference bases covered by the edit.
    #[inline]
    pub fn from_length(&self) -> usize {
        self.from_length
    }

    /// Returns the number of query bases covered by the edit.
    #[inline]
    pub fn to_length(&self) -> usize {
        self.to_length
    }

    /// Returns the stored query bases, if any.
    #[inline]
    pub fn sequence(&self) -> Option<&[u8]> {
        self.sequence.as_deref()
    }

    /// Returns the kind of the edit.
    pub fn kind(&self) -> EditKind {
        if self.from_length == 0 {
            if self.sequence.is_some() { EditKind::Insertion } else { EditKind::SoftClip }
        } else if self.to_length == 0 {
            EditKind::Deletion
        } else if self.sequence.is_some() {
            EditKind::Substitution
        } else {
            EditKind::Match
        }
    }

    /// Returns the edit as a difference string operation, or [`None`] for a soft clip.
    pub fn to_difference(&self) -> Option<Difference> {
        match self.kind() {
            EditKind::Match => Some(Difference::Match(self.from_length)),
            EditKind::Substitution => self.sequence().map(|seq| Difference::Mismatch(seq[0])),
            EditKind::Deletion => Some(Difference::Deletion(self.from_length)),
            EditKind::Insertion => self.sequence().map(|seq| Difference::Insertion(seq.to_vec())),
            EditKind::SoftClip => None,
        }
    }

    fn to_json(&self) -> JSONValue {
        let mut values: Vec<(String, JSONValue)> = vec![
            ("from_length".to_string(), JSONValue::Number(self.from_length as isize)),
            ("to_length".to_string(), JSONValue::Number(self.to_length as isize)),
        ];
        if let Some(sequence) = self.sequence() {
            values.push(("sequence".to_string(), JSONValue::String(String::from_utf8_lossy(sequence).to_string())));
        }
        JSONValue::Object(values)
    }
}

//-----------------------------------------------------------------------------

/// The part of an alignment within a single node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    /// Starting position in the node.
    pub position: Position,
    /// Edits in the node.
    pub edits: Vec<Edit>,
}

impl Mapping {
    /// Creates a new mapping without edits.
    pub fn new(position: Position) -> Self {
        Mapping { position, edits: Vec::new() }
    }

    /// Returns the identifier of the node.
    #[inline]
    pub fn node_id(&self) -> usize {
        self.position.node_id
    }

    /// Returns the number of reference bases covered by the edits.
    pub fn from_length(&self) -> usize {
        self.edits.iter().map(|edit| edit.from_length()).sum()
    }

    /// Returns the number of query bases covered by the edits.
    pub fn to_length(&self) -> usize {
        self.edits.iter().map(|edit| edit.to_length()).sum()
    }

    fn to_json(&self) -> JSONValue {
        JSONValue::Object(vec![
            ("position".to_string(), JSONValue::Object(vec![
                ("node_id".to_string(), JSONValue::Number(self.position.node_id as isize)),
                ("offset".to_string(), JSONValue::Number(self.position.offset as isize)),
            ])),
            ("edit".to_string(), JSONValue::Array(self.edits.iter().map(|edit| edit.to_json()).collect())),
        ])
    }
}

/// An alignment path as a sequence of mappings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    /// Position of the first aligned reference base.
    pub position: Position,
    /// Mappings in traversal order.
    pub mappings: Vec<Mapping>,
}

impl Path {
    /// Returns `true` if the path does not visit any nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns the node identifiers in traversal order.
    pub fn node_ids(&self) -> Vec<usize> {
        self.mappings.iter().map(|mapping| mapping.node_id()).collect()
    }
}

//-----------------------------------------------------------------------------

/// An alignment between a query sequence and a path in a graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Name of the query sequence.
    pub name: String,
    /// The query sequence.
    pub sequence: Vec<u8>,
    /// Alignment score.
    pub score: isize,
    /// Score of the best alignment that does not end near this one, if any.
    pub secondary_score: Option<isize>,
    /// Offset of the first query base participating in the alignment.
    pub query_position: usize,
    /// The alignment path.
    pub path: Path,
    /// How the soft clips in the path moved the cursors.
    pub soft_clip: SoftClipPolicy,
}

impl Alignment {
    /// Creates an unaligned alignment object for the given query.
    pub fn new(name: &str, sequence: &[u8]) -> Self {
        Alignment {
            name: name.to_string(),
            sequence: sequence.to_vec(),
            ..Default::default()
        }
    }

    /// Returns `true` if the query is unaligned.
    #[inline]
    pub fn is_unaligned(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns the edits of the alignment in traversal order.
    pub fn edits(&self) -> impl Iterator<Item = &Edit> {
        self.path.mappings.iter().flat_map(|mapping| mapping.edits.iter())
    }

    /// Returns the number of query bases covered by the path.
    pub fn to_length(&self) -> usize {
        self.path.mappings.iter().map(|mapping| mapping.to_length()).sum()
    }

    /// Returns the interval of the query sequence covered by the edits other than soft clips.
    ///
    /// With [`SoftClipPolicy::AdvanceQuery`], the interval excludes the soft clips at the start and the end of the path.
    /// With [`SoftClipPolicy::AdvanceReference`], soft clips do not consume query bases and the interval starts from 0.
    pub fn query_interval(&self) -> Range<usize> {
        let clipped = |edit: &&Edit| edit.kind() == EditKind::SoftClip;
        match self.soft_clip {
            SoftClipPolicy::AdvanceQuery => {
                let start: usize = self.edits().take_while(clipped).map(|edit| edit.to_length()).sum();
                let start = start.min(self.sequence.len());
                let edits: Vec<&Edit> = self.edits().collect();
                let end_clip: usize = edits.iter().rev().copied().take_while(clipped).map(|edit| edit.to_length()).sum();
                start..self.sequence.len().saturating_sub(end_clip).max(start)
            },
            SoftClipPolicy::AdvanceReference => {
                let aligned: usize = self.edits().filter(|edit| !clipped(edit)).map(|edit| edit.to_length()).sum();
                0..aligned.min(self.sequence.len())
            },
        }
    }

    // Returns the offset of the first aligned base in the concatenated target path.
    // Soft clips are allowed only at the start and the end of the path.
    fn target_start<G: NodeSequences>(&self, nodes: &G) -> Result<usize, String> {
        let edits: Vec<&Edit> = self.edits().collect();
        let leading = edits.iter().take_while(|edit| edit.kind() == EditKind::SoftClip).count();
        let trailing = edits[leading..].iter().rev().take_while(|edit| edit.kind() == EditKind::SoftClip).count();
        if edits[leading..edits.len() - trailing].iter().any(|edit| edit.kind() == EditKind::SoftClip) {
            return Err(String::from("Soft clips are supported only at the ends of the alignment"));
        }

        // Walk the mappings until the first edit that is not a leading soft clip.
        let mut node_start = 0;
        let mut seen = 0;
        for mapping in self.path.mappings.iter() {
            let mut from_pos = mapping.position.offset;
            for edit in mapping.edits.iter() {
                if seen >= leading {
                    return Ok(node_start + from_pos);
                }
                if self.soft_clip == SoftClipPolicy::AdvanceReference {
                    from_pos += edit.to_length();
                }
                seen += 1;
            }
            let len = nodes.node_sequence(mapping.node_id()).map(|sequence| sequence.len()).ok_or(
                format!("Path node {} does not exist", mapping.node_id())
            )?;
            node_start += len;
        }
        Ok(node_start)
    }

    /// Returns the alignment as a normalized difference string.
    ///
    /// Soft clips are not included.
    pub fn difference(&self) -> Vec<Difference> {
        let ops = self.edits().filter_map(|edit| edit.to_difference()).collect();
        Difference::normalize(ops)
    }

    /// Returns the number of (matches, mismatches, inserted bases, deleted bases).
    pub fn edit_counts(&self) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for edit in self.edits() {
            match edit.kind() {
                EditKind::Match => counts.0 += edit.from_length(),
                EditKind::Substitution => counts.1 += 1,
                EditKind::Insertion => counts.2 += edit.to_length(),
                EditKind::Deletion => counts.3 += edit.from_length(),
                EditKind::SoftClip => {},
            }
        }
        counts
    }

    /// Returns the fraction of aligned bases that are matches, or [`None`] if there are no aligned bases.
    pub fn identity(&self) -> Option<f64> {
        let (matches, mismatches, insertions, deletions) = self.edit_counts();
        let total = matches + mismatches + insertions + deletions;
        if total == 0 {
            None
        } else {
            Some(matches as f64 / total as f64)
        }
    }
}

//-----------------------------------------------------------------------------

/// Output formats.
impl Alignment {
    // Placeholder value for a missing mapping quality.
    const MISSING_MAPQ: usize = 255;

    // The field is empty and the value is missing.
    const MISSING_VALUE: &'static [u8] = b"*";

    /// Returns the alignment as a GAF line without the trailing newline.
    ///
    /// The node sequences are used for determining the length of the target path and for writing the difference string (tag `cs`).
    /// The line also contains the alignment score (tag `AS`) and the secondary score (tag `s2`) if it is present.
    /// Mapping quality is always missing.
    /// The query interval is [`Self::query_interval`], and the target interval follows [`Self::soft_clip`] in the same way.
    /// Returns an error if a node on the path does not exist, if the path extends past the end of the target, or if a soft clip is not at either end of the alignment.
    pub fn to_gaf_line<G: NodeSequences>(&self, nodes: &G) -> Result<Vec<u8>, String> {
        let mut buffer: Vec<u8> = Vec::new();

        // Query sequence.
        if self.name.is_empty() {
            buffer.extend_from_slice(Self::MISSING_VALUE);
        } else {
            buffer.extend_from_slice(self.name.as_bytes());
        }
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, self.sequence.len());
        buffer.push(b'\t');

        if self.is_unaligned() {
            buffer.extend_from_slice(b"0\t0\t*\t*\t0\t0\t0\t0\t0\t");
            utils::append_usize(&mut buffer, Self::MISSING_MAPQ);
            return Ok(buffer);
        }

        // Build the target sequence, starting from the first aligned base.
        let mut target: Vec<u8> = Vec::new();
        for id in self.path.node_ids() {
            let sequence = nodes.node_sequence(id).ok_or(format!("Path node {} does not exist", id))?;
            target.extend_from_slice(sequence);
        }
        let path_len = target.len();
        let path_start = self.target_start(nodes)?;
        if path_start > path_len {
            return Err(format!("Path start {} is past the end of the target path of length {}", path_start, path_len));
        }
        let difference = self.difference();
        let cs = Difference::to_bytes(&difference, &target[path_start..])?;
        let (query_len, target_len, matches, edits) = Difference::stats(&difference);

        let query_interval = self.query_interval();
        utils::append_usize(&mut buffer, query_interval.start);
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, query_interval.start + query_len);
        buffer.extend_from_slice(b"\t+\t");

        // Target path.
        formats::append_walk(&mut buffer, &self.path.node_ids());
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, path_len);
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, path_start);
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, path_start + target_len);
        buffer.push(b'\t');

        // Alignment statistics.
        utils::append_usize(&mut buffer, matches);
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, matches + edits);
        buffer.push(b'\t');
        utils::append_usize(&mut buffer, Self::MISSING_MAPQ);

        // Optional fields.
        TypedField::Int([b'A', b'S'], self.score).append_to(&mut buffer, true);
        if let Some(score) = self.secondary_score {
            TypedField::Int([b's', b'2'], score).append_to(&mut buffer, true);
        }
        TypedField::append_string(&mut buffer, [b'c', b's'], &cs, true);

        Ok(buffer)
    }

    /// Returns the alignment as a JSON object in the style of vg.
    ///
    /// The object contains fields `name` (if present), `sequence`, `score`, `secondary_score` (an array, if present), `query_position`, and `path`.
    /// The path contains an array of mappings with fields `position` and `edit`.
    pub fn to_json(&self) -> JSONValue {
        let mut values: Vec<(String, JSONValue)> = Vec::new();
        if !self.name.is_empty() {
            values.push(("name".to_string(), JSONValue::String(self.name.clone())));
        }
        values.push(("sequence".to_string(), JSONValue::String(String::from_utf8_lossy(&self.sequence).to_string())));
        values.push(("score".to_string(), JSONValue::Number(self.score)));
        if let Some(score) = self.secondary_score {
            values.push(("secondary_score".to_string(), JSONValue::Array(vec![JSONValue::Number(score)])));
        }
        values.push(("query_position".to_string(), JSONValue::Number(self.query_position as isize)));
        values.push(("path".to_string(), JSONValue::Object(vec![
            ("mapping".to_string(), JSONValue::Array(self.path.mappings.iter().map(|mapping| mapping.to_json()).collect())),
        ])));
        JSONValue::Object(values)
    }
}

//-----------------------------------------------------------------------------
