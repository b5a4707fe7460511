//! Streaming byte-exact comparison
//!
//! Content equality is decided by reading both inputs chunk by chunk from
//! the start. Sizes are never consulted up front and no hashing is done.

use std::fs::File;
use std::io::{self, ErrorKind, Read};

use crate::{Error, NormalizedPath, Result};

/// Chunk size used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Largest chunk actually allocated; bigger requests are capped.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;

/// Compare two readers byte for byte.
///
/// Returns `true` iff both streams yield the same bytes and end at the same
/// point. `chunk_size` is clamped to `1..=MAX_CHUNK_SIZE`.
pub fn streams_equal<A: Read, B: Read>(a: &mut A, b: &mut B, chunk_size: usize) -> io::Result<bool> {
    compare_chunked(a, b, chunk_size, |e| e, |e| e)
}

/// Compare the contents of two files byte for byte.
///
/// Both handles are closed before returning, on success and on error.
pub fn files_equal(a: &NormalizedPath, b: &NormalizedPath, chunk_size: usize) -> Result<bool> {
    let path_a = a.to_native();
    let path_b = b.to_native();

    let mut file_a = File::open(&path_a).map_err(|e| Error::io(&path_a, e))?;
    let mut file_b = File::open(&path_b).map_err(|e| Error::io(&path_b, e))?;

    compare_chunked(
        &mut file_a,
        &mut file_b,
        chunk_size,
        |e| Error::io(&path_a, e),
        |e| Error::io(&path_b, e),
    )
}

fn compare_chunked<A, B, E>(
    a: &mut A,
    b: &mut B,
    chunk_size: usize,
    err_a: impl Fn(io::Error) -> E,
    err_b: impl Fn(io::Error) -> E,
) -> std::result::Result<bool, E>
where
    A: Read,
    B: Read,
{
    let chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let count_a = fill_chunk(a, &mut buf_a).map_err(&err_a)?;
        let count_b = fill_chunk(b, &mut buf_b).map_err(&err_b)?;

        if count_a != count_b {
            return Ok(false);
        }
        if count_a == 0 {
            return Ok(true);
        }
        if buf_a[..count_a] != buf_b[..count_b] {
            return Ok(false);
        }
    }
}

/// Read until `buf` is full or the stream ends.
///
/// A single `read` may return fewer bytes than asked for, so chunk
/// boundaries of the two inputs would drift apart without this.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
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
