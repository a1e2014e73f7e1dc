//! Aligning sequences to a graph.
//!
//! [`GraphAlignmentEngine`] builds an [`AlignableGraph`] once from a [`Graph`] and then aligns any number of queries to it.
//! Each alignment runs the fill and traceback steps of an [`Aligner`] and translates the resulting [`RawTraceback`] into an [`Alignment`] using [`translate`].
//!
//! # Examples
//!
//! ```
//! use graph_aligner::{Edge, Graph, GraphAlignmentEngine, Node, ScalarAligner, ScoringParams};
//! use graph_aligner::{Edit, Position};
//!
//! let graph = Graph::new(
//!     vec![Node::new(1, b"GATT"), Node::new(2, b"ACA"), Node::new(3, b"TTAG")],
//!     vec![Edge::new(1, 2), Edge::new(2, 3)],
//! ).unwrap();
//! let engine = GraphAlignmentEngine::new(&graph, ScoringParams::default(), ScalarAligner::new()).unwrap();
//!
//! let alignment = engine.align_named("read", b"TTACAGTAG").unwrap();
//! assert_eq!(alignment.name, "read");
//! assert_eq!(alignment.path.node_ids(), vec![1, 2, 3]);
//! assert_eq!(alignment.path.position, Position::new(1, 2));
//! assert_eq!(alignment.path.mappings[1].edits, vec![Edit::match_run(3)]);
//! assert_eq!(alignment.path.mappings[2].edits, vec![Edit::substitution(b'G'), Edit::match_run(3)]);
//! ```

use crate::aligner::{AlignableGraph, Aligner, ScoringParams};
use crate::alignment::Alignment;
use crate::graph::Graph;
use crate::traceback::RawTraceback;
use crate::translate::{self, SoftClipPolicy};


//-----------------------------------------------------------------------------

/// An engine for aligning sequences to a directed acyclic graph.
///
/// The engine borrows the graph and owns the aligner, the scoring parameters, and the [`AlignableGraph`] built from the graph.
/// Aligning a query does not modify the engine.
#[derive(Clone, Debug)]
pub struct GraphAlignmentEngine<'a, A: Aligner> {
    graph: &'a Graph,
    alignable: AlignableGraph,
    scoring: ScoringParams,
    aligner: A,
    soft_clip: SoftClipPolicy,
}

impl<'a, A: Aligner> GraphAlignmentEngine<'a, A> {
    /// Creates a new engine for the graph.
    ///
    /// Returns an error if an edge refers to a node that does not exist, if a node has an empty sequence, or if the graph contains a cycle.
    pub fn new(graph: &'a Graph, scoring: ScoringParams, aligner: A) -> Result<Self, String> {
        let alignable = AlignableGraph::new(graph, &scoring)?;
        Ok(GraphAlignmentEngine {
            graph, alignable, scoring, aligner,
            soft_clip: SoftClipPolicy::default(),
        })
    }

    /// Returns the engine with the given soft clip policy for translating tracebacks.
    pub fn with_soft_clip_policy(mut self, policy: SoftClipPolicy) -> Self {
        self.soft_clip = policy;
        self
    }

    /// Returns the graph.
    #[inline]
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Returns the alignable graph.
    #[inline]
    pub fn alignable_graph(&self) -> &AlignableGraph {
        &self.alignable
    }

    /// Returns the scoring parameters.
    #[inline]
    pub fn scoring(&self) -> &ScoringParams {
        &self.scoring
    }

    /// Returns the soft clip policy.
    #[inline]
    pub fn soft_clip_policy(&self) -> SoftClipPolicy {
        self.soft_clip
    }

    /// Runs the fill and traceback steps of the aligner for the query.
    ///
    /// Returns an error if the aligner fails.
    pub fn traceback(&self, query: &[u8]) -> Result<RawTraceback, String> {
        let params = self.scoring.fill_params();
        let state = self.aligner.fill(&self.alignable, query, &params)?;
        self.aligner.traceback(&self.alignable, &state, query, &self.scoring)
    }

    /// Aligns the query to the graph.
    ///
    /// The alignment has an empty name.
    /// Returns an error if the aligner fails or if the traceback cannot be translated.
    pub fn align(&self, query: &[u8]) -> Result<Alignment, String> {
        let traceback = self.traceback(query)?;
        translate::translate(&traceback, query, self.graph, self.soft_clip).map_err(|err| err.to_string())
    }

    /// Aligns the query to the graph and sets the name of the alignment.
    ///
    /// See [`GraphAlignmentEngine::align`].
    pub fn align_named(&self, name: &str, query: &[u8]) -> Result<Alignment, String> {
        let mut alignment = self.align(query).map_err(|err| {
            format!("{}: {}", name, err)
        })?;
        alignment.name = name.to_string();
        Ok(alignment)
    }
}

//-----------------------------------------------------------------------------
