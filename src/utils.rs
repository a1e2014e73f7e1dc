//! Utility functions and structures.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::io::{BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;

//-----------------------------------------------------------------------------

/// Returns the full file name for a specific test file.
pub fn get_test_data(filename: &'static str) -> PathBuf {
    let mut buf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    buf.push("test-data");
    buf.push(filename);
    buf
}

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 6] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0, "PiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

/// Returns `true` if the file appears to be gzip-compressed.
pub fn is_gzipped<P: AsRef<Path>>(filename: P) -> bool {
    let file = match File::open(filename) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0; 2];
    let len = reader.read(&mut magic).ok();
    len == Some(2) && magic == [0x1F, 0x8B]
}

/// Returns a buffered reader for the file, which may be gzip-compressed.
pub fn open_file<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, String> {
    let file = File::open(&filename).map_err(|x| {
        format!("Cannot open {}: {}", filename.as_ref().display(), x)
    })?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------

// Byte buffers.

/// Appends an unsigned integer to a string represented as `Vec<u8>`.
pub fn append_usize(buffer: &mut Vec<u8>, value: usize) {
    buffer.extend_from_slice(value.to_string().as_bytes());
}

/// Appends a signed integer to a string represented as `Vec<u8>`.
pub fn append_isize(buffer: &mut Vec<u8>, value: isize) {
    buffer.extend_from_slice(value.to_string().as_bytes());
}

/// Removes trailing `\n` and `\r\n` line endings from the buffer.
pub fn trim_line_end(buffer: &mut Vec<u8>) {
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
    }
}

/// Parses an unsigned integer from a byte field.
pub fn parse_usize(field: &[u8], field_name: &str) -> Result<usize, String> {
    let number = std::str::from_utf8(field).map_err(|err| {
        format!("Invalid {}: {}", field_name, err)
    })?;
    number.parse().map_err(|err| {
        format!("Invalid {} {}: {}", field_name, number, err)
    })
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_readable() {
        assert_eq!(human_readable_size(0), "0.000 B");
        assert_eq!(human_readable_size(1536), "1.500 KiB");
        assert_eq!(human_readable_size(3 * 1024 * 1024), "3.000 MiB");
    }

    #[test]
    fn line_endings() {
        let mut unix = b"ACGT\n".to_vec();
        trim_line_end(&mut unix);
        assert_eq!(unix, b"ACGT");
        let mut windows = b"ACGT\r\n".to_vec();
        trim_line_end(&mut windows);
        assert_eq!(windows, b"ACGT");
        let mut none = b"ACGT".to_vec();
        trim_line_end(&mut none);
        assert_eq!(none, b"ACGT");
    }

    #[test]
    fn integer_fields() {
        assert_eq!(parse_usize(b"42", "number"), Ok(42));
        assert!(parse_usize(b"-1", "number").is_err(), "Parsed a negative number");
        assert!(parse_usize(b"4x2", "number").is_err(), "Parsed an invalid number");

        let mut buffer = b"x".to_vec();
        append_usize(&mut buffer, 123);
        append_isize(&mut buffer, -7);
        assert_eq!(buffer, b"x123-7");
    }

    #[test]
    fn compressed_files() {
        let plain = get_test_data("small.gfa");
        let compressed = get_test_data("small.gfa.gz");
        assert!(file_exists(&plain), "Missing test file {}", plain.display());
        assert!(!is_gzipped(&plain), "Plain file detected as gzipped");
        assert!(is_gzipped(&compressed), "Compressed file not detected as gzipped");
        assert!(file_size(&plain).is_some(), "No size for an existing file");

        let mut plain_text = String::new();
        let mut reader = open_file(&plain).unwrap();
        reader.read_to_string(&mut plain_text).unwrap();
        let mut decompressed = String::new();
        let mut reader = open_file(&compressed).unwrap();
        reader.read_to_string(&mut decompressed).unwrap();
        assert_eq!(decompressed, plain_text, "Decompressed content differs from the plain file");
    }
}

//-----------------------------------------------------------------------------
