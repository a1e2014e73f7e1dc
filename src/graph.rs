//! A sequence graph with integer node identifiers.
//!
//! [`Graph`] is the input to [`crate::GraphAlignmentEngine`].
//! It stores the nodes and the directed edges in the order they were given, and it provides access to node sequences by identifier through the [`NodeSequences`] trait.
//! The graph is immutable after construction.
//!
//! Graphs can be built in memory or loaded from a GFA 1 file.
//! Only segment (`S`) and link (`L`) lines are used, and segment names must be integers.
//! Both segments must be in forward orientation in each link.
//!
//! # Examples
//!
//! ```
//! use graph_aligner::{Graph, Node, Edge, NodeSequences};
//!
//! let nodes = vec![Node::new(1, b"GATT"), Node::new(2, b"ACA")];
//! let edges = vec![Edge::new(1, 2)];
//! let graph = Graph::new(nodes, edges).unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.node_sequence(2), Some(&b"ACA"[..]));
//! assert_eq!(graph.node_sequence(3), None);
//! ```

use crate::{formats, utils};

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;


//-----------------------------------------------------------------------------

/// Access to node sequences by node identifier.
pub trait NodeSequences {
    /// Returns the sequence of the node, or [`None`] if there is no such node.
    fn node_sequence(&self, id: usize) -> Option<&[u8]>;
}

//-----------------------------------------------------------------------------

/// A node with an integer identifier and a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Node identifier.
    pub id: usize,
    /// Sequence of bases.
    pub sequence: Vec<u8>,
}

impl Node {
    /// Creates a new node.
    pub fn new(id: usize, sequence: &[u8]) -> Self {
        Node { id, sequence: sequence.to_vec() }
    }

    /// Returns the length of the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A directed edge between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Source node identifier.
    pub from: usize,
    /// Destination node identifier.
    pub to: usize,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(from: usize, to: usize) -> Self {
        Edge { from, to }
    }
}

/// A position in the graph as (node identifier, offset in the node sequence).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Node identifier.
    pub node_id: usize,
    /// Offset in the node sequence.
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(node_id: usize, offset: usize) -> Self {
        Position { node_id, offset }
    }
}

//-----------------------------------------------------------------------------

/// A sequence graph.
///
/// Edges are not validated here, as they may refer to nodes outside the graph.
/// See [`crate::GraphAlignmentEngine::new`] for the requirements of an alignable graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    // Node identifier to offset in `nodes`.
    index: HashMap<usize, usize>,
}

impl Graph {
    /// Creates a new graph from nodes and edges.
    ///
    /// Returns an error if there are multiple nodes with the same identifier.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (offset, node) in nodes.iter().enumerate() {
            if index.insert(node.id, offset).is_some() {
                return Err(format!("Duplicate node identifier {}", node.id));
            }
        }
        Ok(Graph { nodes, edges, index })
    }

    /// Returns the number of nodes in the graph.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the total length of the node sequences.
    pub fn sequence_len(&self) -> usize {
        self.nodes.iter().map(|node| node.len()).sum()
    }

    /// Returns the nodes in the original order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the edges in the original order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the node with the given identifier, or [`None`] if there is no such node.
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.index.get(&id).map(|&offset| &self.nodes[offset])
    }

    /// Returns `true` if the graph contains a node with the given identifier.
    #[inline]
    pub fn has_node(&self, id: usize) -> bool {
        self.index.contains_key(&id)
    }
}

impl NodeSequences for Graph {
    fn node_sequence(&self, id: usize) -> Option<&[u8]> {
        self.node(id).map(|node| node.sequence.as_slice())
    }
}

//-----------------------------------------------------------------------------

/// Reading and writing GFA.
impl Graph {
    const MISSING_SEQUENCE: &'static [u8] = b"*";

    // Accepted overlaps in link lines.
    const NO_OVERLAP: [&'static [u8]; 2] = [b"0M", b"*"];

    fn parse_segment(fields: &[&[u8]], line_num: usize) -> Result<Node, String> {
        if fields.len() < 3 {
            return Err(format!("Line {}: Segment line with fewer than 3 fields", line_num));
        }
        let id = utils::parse_usize(fields[1], "segment name").map_err(|err| {
            format!("Line {}: {} (only numerical segment names are supported)", line_num, err)
        })?;
        if fields[2] == Self::MISSING_SEQUENCE {
            return Err(format!("Line {}: Segment {} has no sequence", line_num, id));
        }
        Ok(Node::new(id, fields[2]))
    }

    fn parse_orientation(field: &[u8], line_num: usize) -> Result<(), String> {
        match field {
            b"+" => Ok(()),
            b"-" => Err(format!("Line {}: Links to reverse orientation are not supported", line_num)),
            _ => Err(format!("Line {}: Invalid orientation {}", line_num, String::from_utf8_lossy(field))),
        }
    }

    fn parse_link(fields: &[&[u8]], line_num: usize) -> Result<Edge, String> {
        if fields.len() < 6 {
            return Err(format!("Line {}: Link line with fewer than 6 fields", line_num));
        }
        let from = utils::parse_usize(fields[1], "segment name").map_err(|err| {
            format!("Line {}: {}", line_num, err)
        })?;
        Self::parse_orientation(fields[2], line_num)?;
        let to = utils::parse_usize(fields[3], "segment name").map_err(|err| {
            format!("Line {}: {}", line_num, err)
        })?;
        Self::parse_orientation(fields[4], line_num)?;
        if !Self::NO_OVERLAP.iter().any(|&overlap| overlap == fields[5]) {
            return Err(format!("Line {}: Overlapping links are not supported", line_num));
        }
        Ok(Edge::new(from, to))
    }

    /// Reads a graph from GFA lines.
    ///
    /// Segment and link lines are used, while all other lines are ignored.
    /// Returns an error if a line cannot be parsed, if the graph uses features that are not supported, or if there are duplicate segments.
    pub fn from_gfa<R: BufRead>(reader: &mut R) -> Result<Self, String> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut edges: Vec<Edge> = Vec::new();

        let mut line_num = 1;
        loop {
            let mut buf: Vec<u8> = Vec::new();
            let len = reader.read_until(b'\n', &mut buf).map_err(|err| {
                format!("Line {}: {}", line_num, err)
            })?;
            if len == 0 {
                break;
            }
            utils::trim_line_end(&mut buf);
            let fields = buf.split(|&c| c == b'\t').collect::<Vec<_>>();
            match fields[0] {
                b"S" => nodes.push(Self::parse_segment(&fields, line_num)?),
                b"L" => edges.push(Self::parse_link(&fields, line_num)?),
                _ => {},
            }
            line_num += 1;
        }

        Self::new(nodes, edges)
    }

    /// Loads a graph from a GFA file, which may be gzip-compressed.
    ///
    /// See [`Graph::from_gfa`] for details.
    pub fn load_gfa<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        let mut reader = utils::open_file(&filename)?;
        Self::from_gfa(&mut reader).map_err(|err| {
            format!("{}: {}", filename.as_ref().display(), err)
        })
    }

    /// Writes the graph in the GFA format.
    ///
    /// The output contains a header line, followed by segment lines in node order and link lines in edge order.
    pub fn write_gfa<T: Write>(&self, output: &mut T) -> io::Result<()> {
        formats::write_gfa_header(output)?;
        for node in self.nodes.iter() {
            formats::write_gfa_node(node.id, &node.sequence, output)?;
        }
        for edge in self.edges.iter() {
            formats::write_gfa_edge(edge.from, edge.to, output)?;
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------
