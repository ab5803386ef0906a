//! File input and output helpers for project data.

use std::fs::File;
use std::io::{self, Read, Write};

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Reads a file to raw bytes; the caller decides on the encoding.
pub fn read_bytes(path: &str) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    File::open(path)?.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing any existing content.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    File::create(path)?.write_all(contents.as_bytes())
}
