//! Support for reading and writing various file formats.
//!
//! ### GFA (writing)
//!
//! The GFA format is a text-based format for representing sequence graphs.
//! See [GFA1.md](https://github.com/GFA-spec/GFA-spec/blob/master/GFA1.md) in the GFA-spec repository for details.
//! The following functions support line-by-line writing of GFA version 1.1:
//!
//! * [`write_gfa_header`]: Write a GFA file header.
//! * [`write_gfa_node`]: Write a segment line for a node.
//! * [`write_gfa_edge`]: Write a link line for an edge.
//!
//! Reading GFA is implemented in [`crate::Graph`].
//!
//! ### JSON (writing)
//!
//! The JSON format is a text-based format for representing structured data.
//! The support for it is based on building a [`JSONValue`] object recursively and then writing it using the [`Display`] trait.
//!
//! ### GAF (writing)
//!
//! The GAF format is a text-based format for representing sequence alignments to a graph.
//! See [rGFA.md](https://github.com/lh3/gfatools/blob/master/doc/rGFA.md) in gfatools for an overview.
//! Some details are better documented in the [minimap2 man page](https://lh3.github.io/minimap2/minimap2.html#10).
//!
//! * [`write_gaf_file_header`]: Write a GAF file header.
//! * [`append_walk`]: Append a GAF path to a buffer.
//! * [`TypedField`]: Optional typed fields.
//!
//! Writing alignment lines is implemented in [`crate::Alignment`].
//!
//! ### FASTA (reading)
//!
//! Query sequences can be read from FASTA files or from plain text files with one sequence per line.
//! See [`read_sequences`].

use crate::utils;

use bio::io::fasta;

use std::fmt::Display;
use std::io::{self, BufRead, Write};


//-----------------------------------------------------------------------------

/// Appends a GAF path over forward nodes to a string represented as `Vec<u8>`.
pub fn append_walk(buffer: &mut Vec<u8>, walk: &[usize]) {
    for &id in walk {
        buffer.push(b'>');
        utils::append_usize(buffer, id);
    }
}

//-----------------------------------------------------------------------------

/// An optional field in a GAF line, stored as a two-byte tag and a value.
///
/// Only the types written for alignments are supported: `i` (integer) and `Z` (string).
///
/// # Examples
///
/// ```
/// use graph_aligner::formats::TypedField;
///
/// let field = TypedField::Int([b'A', b'S'], -12);
/// assert_eq!(field.to_string(), "AS:i:-12");
/// let mut buffer = b"read".to_vec();
/// field.append_to(&mut buffer, true);
/// assert_eq!(buffer, b"read\tAS:i:-12");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedField {
    /// An integer.
    Int([u8; 2], isize),
    /// A string.
    String([u8; 2], Vec<u8>),
}

impl TypedField {
    /// Returns the tag.
    pub fn tag(&self) -> [u8; 2] {
        match self {
            TypedField::Int(tag, _) | TypedField::String(tag, _) => *tag,
        }
    }

    /// Appends `TAG:TYPE:VALUE` to the buffer, preceded by a tab if `as_new_field` is set.
    pub fn append_to(&self, buffer: &mut Vec<u8>, as_new_field: bool) {
        match self {
            TypedField::Int(tag, value) => {
                Self::append_header(buffer, *tag, b'i', as_new_field);
                utils::append_isize(buffer, *value);
            },
            TypedField::String(tag, value) => Self::append_string(buffer, *tag, value, as_new_field),
        }
    }

    /// Appends a string field without building a `TypedField` first.
    ///
    /// See [`TypedField::append_to`].
    pub fn append_string(buffer: &mut Vec<u8>, tag: [u8; 2], value: &[u8], as_new_field: bool) {
        Self::append_header(buffer, tag, b'Z', as_new_field);
        buffer.extend_from_slice(value);
    }

    fn append_header(buffer: &mut Vec<u8>, tag: [u8; 2], field_type: u8, as_new_field: bool) {
        if as_new_field {
            buffer.push(b'\t');
        }
        buffer.extend_from_slice(&[tag[0], tag[1], b':', field_type, b':']);
    }
}

impl Display for TypedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buffer: Vec<u8> = Vec::new();
        self.append_to(&mut buffer, false);
        write!(f, "{}", String::from_utf8_lossy(&buffer))
    }
}

//-----------------------------------------------------------------------------

/// Writes a GAF file header.
pub fn write_gaf_file_header<T: Write>(output: &mut T) -> io::Result<()> {
    output.write_all(b"@HD\tVN:Z:1.0\n")?;
    Ok(())
}

//-----------------------------------------------------------------------------

/// Writes the GFA header line.
pub fn write_gfa_header<T: Write>(output: &mut T) -> io::Result<()> {
    output.write_all(b"H\tVN:Z:1.1\n")?;
    Ok(())
}

/// Writes a GFA segment line corresponding to a node with an integer identifier.
pub fn write_gfa_node<T: Write>(node_id: usize, sequence: &[u8], output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();

    buffer.extend_from_slice(b"S\t");
    utils::append_usize(&mut buffer, node_id);
    buffer.push(b'\t');
    buffer.extend_from_slice(sequence);
    buffer.push(b'\n');

    output.write_all(&buffer)?;
    Ok(())
}

/// Writes a GFA link line corresponding to an edge between two forward nodes.
pub fn write_gfa_edge<T: Write>(from: usize, to: usize, output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();

    buffer.extend_from_slice(b"L\t");
    utils::append_usize(&mut buffer, from);
    buffer.extend_from_slice(b"\t+\t");
    utils::append_usize(&mut buffer, to);
    buffer.extend_from_slice(b"\t+\t0M\n");

    output.write_all(&buffer)?;
    Ok(())
}

//-----------------------------------------------------------------------------

/// A structured JSON value.
///
/// # Examples
///
/// ```
/// use graph_aligner::formats::JSONValue;
///
/// let value = JSONValue::Object(vec![
///     ("node_id".to_string(), JSONValue::String("12".to_string())),
///     ("offset".to_string(), JSONValue::Number(3)),
/// ]);
/// assert_eq!(value.to_string(), "{\"node_id\": \"12\", \"offset\": 3}");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JSONValue {
    /// A string value.
    ///
    /// Quotes, backslashes, and control characters are escaped when the value is written.
    String(String),

    /// A number value.
    Number(isize),

    /// An array of JSON values.
    Array(Vec<JSONValue>),

    /// A JSON object storing a list of JSON values with string names.
    Object(Vec<(String, JSONValue)>),
}

// Writes a quoted JSON string with the necessary escapes.
fn write_json_string(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl Display for JSONValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JSONValue::String(s) => write_json_string(f, s),
            JSONValue::Number(n) => write!(f, "{}", n),
            JSONValue::Array(v) => {
                write!(f, "[")?;
                let mut first = true;
                for value in v.iter() {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            },
            JSONValue::Object(v) => {
                write!(f, "{{")?;
                let mut first = true;
                for (key, value) in v.iter() {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write_json_string(f, key)?;
                    write!(f, ": {}", value)?;
                }
                write!(f, "}}")
            },
        }
    }
}

//-----------------------------------------------------------------------------

/// A named query sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Name of the sequence.
    pub name: String,
    /// The sequence.
    pub sequence: Vec<u8>,
}

/// Reads all sequences from a FASTA file or from a file with one sequence per line.
///
/// The format is determined by the first non-empty line.
/// If it starts with `>`, the file is parsed as FASTA and the name of each sequence is the first word of the header line.
/// Sequences may span multiple lines.
/// Otherwise each non-empty line is a sequence, and the sequences are named by their line numbers.
///
/// Returns an error if reading fails or if a FASTA record has an empty name or sequence.
pub fn read_sequences<R: BufRead>(reader: &mut R) -> Result<Vec<SequenceRecord>, String> {
    // Skip empty lines until the first byte of content.
    let mut line_num = 1;
    let first = loop {
        let buf = reader.fill_buf().map_err(|err| format!("Line {}: {}", line_num, err))?;
        if buf.is_empty() {
            return Ok(Vec::new());
        }
        let skip = buf.iter().take_while(|&&c| c == b'\n' || c == b'\r').count();
        line_num += buf[..skip].iter().filter(|&&c| c == b'\n').count();
        if skip < buf.len() {
            let first = buf[skip];
            reader.consume(skip);
            break first;
        }
        reader.consume(skip);
    };

    if first == b'>' {
        read_fasta(reader)
    } else {
        read_lines(reader, line_num)
    }
}

fn read_fasta<R: BufRead>(reader: &mut R) -> Result<Vec<SequenceRecord>, String> {
    let mut result: Vec<SequenceRecord> = Vec::new();
    for record in fasta::Reader::from_bufread(reader).records() {
        let record = record.map_err(|err| format!("FASTA record {}: {}", result.len() + 1, err))?;
        if record.id().is_empty() {
            return Err(format!("FASTA record {} has an empty name", result.len() + 1));
        }
        if record.seq().is_empty() {
            return Err(format!("FASTA record {} has an empty sequence", record.id()));
        }
        result.push(SequenceRecord { name: record.id().to_string(), sequence: record.seq().to_vec() });
    }
    Ok(result)
}

fn read_lines<R: BufRead>(reader: &mut R, mut line_num: usize) -> Result<Vec<SequenceRecord>, String> {
    let mut result: Vec<SequenceRecord> = Vec::new();
    loop {
        let mut buf: Vec<u8> = Vec::new();
        let len = reader.read_until(b'\n', &mut buf).map_err(|err| {
            format!("Line {}: {}", line_num, err)
        })?;
        if len == 0 {
            break;
        }
        utils::trim_line_end(&mut buf);
        if !buf.is_empty() {
            result.push(SequenceRecord { name: line_num.to_string(), sequence: buf });
        }
        line_num += 1;
    }
    Ok(result)
}

//-----------------------------------------------------------------------------
