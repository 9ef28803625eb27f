//! bzip2 request body compression.

use bzip2::Compression;
use bzip2::write::BzEncoder;
use std::io::Write;

/// Value of the `request_compression` query parameter.
pub const REQUEST_COMPRESSION: &str = "bzip2";

/// Compresses a form-encoded request body.
pub fn compress(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}
