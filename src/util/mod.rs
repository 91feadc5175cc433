//! Internal utility functions and helpers.
//!
//! This module contains small helper functions used throughout the crate.
//! It is an implementation detail and not part of the public API.

use std::io::{ErrorKind, Read};

/// Reads until `buf` is full or the reader reaches end of stream.
///
/// Returns the number of bytes read. Unlike [`Read::read_exact`], a short
/// final fill is not an error; unlike [`Read::read`], a short read from the
/// underlying source does not end the fill early.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
