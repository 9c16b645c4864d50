// src/decode/handle.rs

//! Extraction of the object handle carried by a FID info record.
//!
//! The record body (everything after the 4-byte info header) is laid out as:
//!
//! ```text
//! fsid[0]: i32 | fsid[1]: i32 | handle_bytes: u32 | handle_type: i32 | f_handle[handle_bytes]
//! ```
//!
//! followed by optional alignment padding.

use crate::decode::cursor::ByteCursor;
use crate::errors::DecodeError;

/// Opaque kernel identifier for a filesystem object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    pub fsid: [i32; 2],
    pub handle_type: i32,
    pub bytes: Vec<u8>,
}

/// Pull the filesystem id and object handle out of a FID record body.
///
/// The handle's declared length is checked against the bytes actually present
/// before slicing; a record that claims more than it carries is rejected with
/// [`DecodeError::TruncatedHandle`].
pub fn extract_handle(body: &[u8]) -> Result<ObjectHandle, DecodeError> {
    let mut cursor = ByteCursor::new(body);
    let truncated = |u: crate::decode::cursor::Underflow| DecodeError::TruncatedHandle {
        declared: u.wanted,
        available: u.remaining,
    };

    let fsid = [
        cursor.read_i32().map_err(truncated)?,
        cursor.read_i32().map_err(truncated)?,
    ];
    let declared = cursor.read_u32().map_err(truncated)? as usize;
    let handle_type = cursor.read_i32().map_err(truncated)?;

    if declared == 0 {
        return Err(DecodeError::TruncatedHandle {
            declared,
            available: cursor.remaining(),
        });
    }

    let bytes = cursor.take(declared).map_err(truncated)?.to_vec();

    Ok(ObjectHandle {
        fsid,
        handle_type,
        bytes,
    })
}
