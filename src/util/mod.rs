//! Internal gzip helpers.
//!
//! Tile archives conventionally store gzip-compressed tiles; ingestion
//! sniffs the two magic bytes and inflates transparently.

/// The gzip stream magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the buffer starts with the gzip magic bytes.
pub(crate) fn is_gzipped(buf: &[u8]) -> bool {
    buf.len() >= 2 && buf[..2] == GZIP_MAGIC
}

/// Inflates a gzip stream into `out`, which is cleared first.
#[cfg(feature = "gzip")]
pub(crate) fn gunzip(buf: &[u8], out: &mut Vec<u8>) -> std::io::Result<()> {
    use std::io::Read;

    use flate2::read::GzDecoder;

    out.clear();
    GzDecoder::new(buf).read_to_end(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_sniffing() {
        assert!(is_gzipped(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzipped(&[0x1a, 0x00]));
        assert!(!is_gzipped(&[0x1f]));
        assert!(!is_gzipped(&[]));
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_gunzip_round_trip() {
        use std::io::Write;

        use flate2::Compression;
        use flate2::write::GzEncoder;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"tile payload").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut out = Vec::new();
        gunzip(&compressed, &mut out).unwrap();
        assert_eq!(out, b"tile payload");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_gunzip_rejects_garbage() {
        let mut out = Vec::new();
        assert!(gunzip(&[0x1f, 0x8b, 0xff, 0xff], &mut out).is_err());
    }
}
