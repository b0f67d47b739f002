//! GIF data sub-block framing.
//!
//! GIF wraps every variable-length payload (LZW pixel data, application
//! extension data, comments) in a chain of sub-blocks: a length byte
//! (1..=255) followed by that many payload bytes, terminated by a single
//! zero length byte.

use crate::error::EncodingError;

/// Largest payload a single sub-block can carry.
pub const MAX_BLOCK_LEN: usize = 255;

/// Append `data` to `out` as a sub-block chain, including the terminator.
///
/// Empty input produces just the terminator byte.
pub fn write_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(MAX_BLOCK_LEN) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
}

/// Read a sub-block chain starting at `pos`, concatenating the payloads.
///
/// Returns the collected bytes and the position just past the terminator.
pub fn collect_blocks(data: &[u8], mut pos: usize) -> Result<(Vec<u8>, usize), EncodingError> {
    let mut collected = Vec::new();

    loop {
        let Some(&len) = data.get(pos) else {
            return Err(EncodingError::unexpected_eof(pos, 1));
        };
        pos += 1;
        if len == 0 {
            return Ok((collected, pos));
        }
        let len = len as usize;
        let Some(payload) = data.get(pos..pos + len) else {
            return Err(EncodingError::unexpected_eof(pos, len));
        };
        collected.extend_from_slice(payload);
        pos += len;
    }
}

/// Skip a sub-block chain starting at `pos` without copying payloads.
///
/// Returns the position just past the terminator.
pub fn skip_blocks(data: &[u8], mut pos: usize) -> Result<usize, EncodingError> {
    loop {
        let Some(&len) = data.get(pos) else {
            return Err(EncodingError::unexpected_eof(pos, 1));
        };
        pos += 1;
        if len == 0 {
            return Ok(pos);
        }
        let len = len as usize;
        if pos + len > data.len() {
            return Err(EncodingError::unexpected_eof(pos, len));
        }
        pos += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        let mut out = Vec::new();
        write_blocks(&mut out, &[]);
        assert_eq!(out, vec![0x00]);

        let (data, pos) = collect_blocks(&out, 0).unwrap();
        assert!(data.is_empty());
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_short_payload() {
        let mut out = Vec::new();
        write_blocks(&mut out, b"abc");
        assert_eq!(out, vec![3, b'a', b'b', b'c', 0]);
    }

    #[test]
    fn test_exact_255_boundary() {
        let payload = vec![0x42u8; 255];
        let mut out = Vec::new();
        write_blocks(&mut out, &payload);
        // One full block plus terminator, not a trailing empty data block.
        assert_eq!(out.len(), 1 + 255 + 1);
        assert_eq!(out[0], 255);
        assert_eq!(*out.last().unwrap(), 0);
    }

    #[test]
    fn test_split_over_255() {
        let payload = vec![0x42u8; 300];
        let mut out = Vec::new();
        write_blocks(&mut out, &payload);
        assert_eq!(out[0], 255);
        assert_eq!(out[256], 45);
        assert_eq!(*out.last().unwrap(), 0);

        let (back, pos) = collect_blocks(&out, 0).unwrap();
        assert_eq!(back, payload);
        assert_eq!(pos, out.len());
    }

    #[test]
    fn test_roundtrip_various_sizes() {
        for size in [1usize, 254, 255, 256, 510, 511, 1000] {
            let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let mut out = Vec::new();
            write_blocks(&mut out, &payload);

            assert_eq!(*out.last().unwrap(), 0, "size {size}");
            let (back, pos) = collect_blocks(&out, 0).unwrap();
            assert_eq!(back, payload, "size {size}");
            assert_eq!(pos, out.len(), "size {size}");
            assert_eq!(skip_blocks(&out, 0).unwrap(), out.len(), "size {size}");
        }
    }

    #[test]
    fn test_truncated_chain() {
        // Length byte promises 10 bytes, only 3 follow.
        let data = [10u8, 1, 2, 3];
        assert!(matches!(
            collect_blocks(&data, 0),
            Err(EncodingError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            skip_blocks(&data, 0),
            Err(EncodingError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_missing_terminator() {
        let data = [2u8, 1, 2];
        assert!(matches!(
            collect_blocks(&data, 0),
            Err(EncodingError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_offset_start() {
        let data = [0xFFu8, 0xFF, 2, 7, 8, 0];
        let (back, pos) = collect_blocks(&data, 2).unwrap();
        assert_eq!(back, vec![7, 8]);
        assert_eq!(pos, 6);
    }
}
