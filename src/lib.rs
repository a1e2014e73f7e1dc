//! # Graph-aligner: aligning sequences to sequence graphs.
//!
//! This crate aligns query sequences to a directed acyclic sequence graph and reports the alignments as paths through the graph.
//! It is intended as the alignment layer of a variation graph toolkit, where the graph is small enough to be aligned against directly (e.g. a local haplotype graph or a bubble).
//!
//! ### Basic concepts
//!
//! A [`Graph`] consists of [`Node`] records with integer identifiers and sequences, and [`Edge`] records between node identifiers.
//! Graphs can be read from and written to GFA files.
//! A location in the graph is a [`Position`], which is a node identifier and an offset in the node sequence.
//!
//! Alignment happens in two stages:
//!
//! * An [`Aligner`] fills the dynamic programming matrices for the query against an [`AlignableGraph`] and traces back the best alignment.
//!   The result is a [`RawTraceback`]: the score, the starting position, and a CIGAR string for each visited node.
//!   [`ScalarAligner`] is a semi-global aligner with affine gap penalties.
//! * [`translate()`] turns the raw traceback into an [`Alignment`].
//!   The alignment has a [`Path`] with one [`Mapping`] for each visited node, and each mapping is a sequence of [`Edit`] operations.
//!
//! [`GraphAlignmentEngine`] ties the stages together.
//! It builds the alignable graph once and then aligns any number of queries.
//!
//! ### Output
//!
//! Alignments can be written as GAF lines with a `cs` difference string (see [`Alignment::to_gaf_line`]) or as JSON objects (see [`Alignment::to_json`]).
//! See [`formats`] for the low-level writers and for reading query sequences.

pub mod aligner;
pub mod alignment;
pub mod engine;
pub mod formats;
pub mod graph;
pub mod traceback;
pub mod translate;
pub mod utils;

#[cfg(test)]
mod internal;

pub use aligner::{AlignableGraph, Aligner, FillParams, ScalarAligner, ScoringParams};
pub use alignment::{Alignment, Difference, Edit, EditKind, Mapping, Path};
pub use engine::GraphAlignmentEngine;
pub use graph::{Edge, Graph, Node, NodeSequences, Position};
pub use traceback::{CigarElement, CigarOp, NodeCigar, RawTraceback};
pub use translate::{translate, SoftClipPolicy, TranslationError};
