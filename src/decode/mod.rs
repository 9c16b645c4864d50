// src/decode/mod.rs

//! Decoding of raw fanotify records.
//!
//! A record is a fixed 24-byte `fanotify_event_metadata` header followed by
//! `event_len - metadata_len` bytes of info records. Reading is split in two:
//!
//! - [`RecordDecoder::read_header`] fails only when the channel itself fails,
//!   which is fatal for the watch loop.
//! - [`RecordDecoder::read_body`] can reject an individual record; those
//!   errors are per-event. The whole record is still consumed, so the next
//!   header is read from the right offset.
//!
//! The fixed header is split by array pattern; the info section is read
//! field by field through [`ByteCursor`]. Nothing reinterprets a buffer as a
//! struct.

pub mod cursor;
pub mod handle;

use std::io::{self, Read};

use tracing::debug;

use crate::abi::{
    EVENT_METADATA_LEN, FAN_EVENT_INFO_TYPE_FID, FAN_Q_OVERFLOW, FANOTIFY_METADATA_VERSION,
    INFO_HEADER_LEN,
};
use crate::errors::{DecodeError, WatchError};

pub use cursor::{ByteCursor, Underflow};
pub use handle::{ObjectHandle, extract_handle};

/// `struct fanotify_event_metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    pub event_len: u32,
    pub version: u8,
    pub metadata_len: u16,
    pub mask: u64,
    pub fd: i32,
    pub pid: i32,
}

impl EventHeader {
    /// Decode a header from exactly [`EVENT_METADATA_LEN`] bytes.
    pub fn parse(bytes: &[u8; EVENT_METADATA_LEN]) -> Self {
        let [
            l0, l1, l2, l3,
            version, _reserved, ml0, ml1,
            m0, m1, m2, m3, m4, m5, m6, m7,
            f0, f1, f2, f3,
            p0, p1, p2, p3,
        ] = *bytes;

        Self {
            event_len: u32::from_ne_bytes([l0, l1, l2, l3]),
            version,
            metadata_len: u16::from_ne_bytes([ml0, ml1]),
            mask: u64::from_ne_bytes([m0, m1, m2, m3, m4, m5, m6, m7]),
            fd: i32::from_ne_bytes([f0, f1, f2, f3]),
            pid: i32::from_ne_bytes([p0, p1, p2, p3]),
        }
    }

    /// Number of bytes that follow the fixed 24-byte header in the stream.
    ///
    /// This covers any metadata beyond the fields we know about plus the info
    /// section.
    pub fn trailing_len(&self) -> Result<usize, DecodeError> {
        let malformed = DecodeError::MalformedHeader {
            event_len: self.event_len,
            metadata_len: self.metadata_len,
        };
        if (self.metadata_len as usize) < EVENT_METADATA_LEN {
            return Err(malformed);
        }
        if self.event_len < u32::from(self.metadata_len) {
            return Err(malformed);
        }
        Ok(self.event_len as usize - EVENT_METADATA_LEN)
    }

    /// Length of the info section (`event_len - metadata_len`).
    pub fn info_len(&self) -> Result<usize, DecodeError> {
        self.trailing_len()?;
        Ok((self.event_len - u32::from(self.metadata_len)) as usize)
    }

    pub fn is_overflow(&self) -> bool {
        self.mask & FAN_Q_OVERFLOW != 0
    }
}

/// `struct fanotify_event_info_header`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub info_type: u8,
    pub len: u16,
}

/// Why a well-formed record produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record carried no info section at all.
    NoInfo,
    /// The leading info record is not a plain FID record.
    OtherInfo(u8),
}

/// Result of decoding one record body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A FID record with its object handle.
    Fid {
        header: EventHeader,
        handle: ObjectHandle,
    },
    /// The kernel dropped events because its queue overflowed.
    Overflow { header: EventHeader },
    /// Nothing to report for this record.
    Skipped {
        header: EventHeader,
        reason: SkipReason,
    },
}

/// Stateless apart from remembering whether an unexpected metadata version
/// has already been reported.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    version_reported: bool,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the next fixed-size header. Any I/O failure here means the
    /// notification channel is unusable.
    pub fn read_header<R: Read>(&mut self, reader: &mut R) -> Result<EventHeader, WatchError> {
        let mut buf = [0u8; EVENT_METADATA_LEN];
        reader.read_exact(&mut buf).map_err(WatchError::FatalRead)?;
        let header = EventHeader::parse(&buf);

        if header.version != FANOTIFY_METADATA_VERSION && !self.version_reported {
            debug!(
                version = header.version,
                expected = FANOTIFY_METADATA_VERSION,
                "unexpected fanotify metadata version; decoding by metadata_len"
            );
            self.version_reported = true;
        }

        Ok(header)
    }

    /// Read and decode the rest of the record described by `header`.
    pub fn read_body<R: Read>(
        &mut self,
        reader: &mut R,
        header: &EventHeader,
    ) -> Result<Decoded, DecodeError> {
        let lens = header
            .trailing_len()
            .and_then(|trailing| Ok((trailing, header.info_len()?)));
        let (trailing, info_len) = match lens {
            Ok(lens) => lens,
            Err(err) => {
                discard_record(reader, header);
                return Err(err);
            }
        };

        // Grows with what is actually read, so a bogus event_len cannot force
        // a huge allocation.
        let mut buf = Vec::new();
        let got = match reader.by_ref().take(trailing as u64).read_to_end(&mut buf) {
            Ok(n) => n,
            Err(_) => buf.len(),
        };
        if got < trailing {
            return Err(DecodeError::ShortRead {
                expected: trailing,
                got,
            });
        }

        let info = &buf[trailing - info_len..];
        decode_info(header, info)
    }

    /// Header and body in one go. Fatal errors are returned as the outer
    /// `Err`, per-record rejections as the inner one.
    pub fn read_record<R: Read>(
        &mut self,
        reader: &mut R,
    ) -> Result<Result<Decoded, DecodeError>, WatchError> {
        let header = self.read_header(reader)?;
        Ok(self.read_body(reader, &header))
    }
}

/// Skip the rest of a record whose header did not validate.
///
/// `event_len` still frames the record in the stream, so as long as it covers
/// the fixed header the remaining bytes are consumed and the next read starts
/// on the following record. An `event_len` below the fixed header leaves
/// nothing to skip.
fn discard_record<R: Read>(reader: &mut R, header: &EventHeader) {
    let rest = (header.event_len as usize).saturating_sub(EVENT_METADATA_LEN);
    if rest == 0 {
        return;
    }
    // A failure here surfaces as a fatal read on the next header.
    let _ = io::copy(&mut reader.by_ref().take(rest as u64), &mut io::sink());
}

/// Decode the info section of a record whose bytes have all been read.
pub fn decode_info(header: &EventHeader, info: &[u8]) -> Result<Decoded, DecodeError> {
    let header = *header;

    if header.is_overflow() {
        return Ok(Decoded::Overflow { header });
    }
    if info.is_empty() {
        return Ok(Decoded::Skipped {
            header,
            reason: SkipReason::NoInfo,
        });
    }

    let mut cursor = ByteCursor::new(info);
    let info_header = read_info_header(&mut cursor)?;
    let record_len = info_header.len as usize;

    if record_len < INFO_HEADER_LEN || record_len > info.len() {
        return Err(DecodeError::MalformedInfo(format!(
            "record length {record_len} outside [{INFO_HEADER_LEN}, {}]",
            info.len()
        )));
    }

    if info_header.info_type != FAN_EVENT_INFO_TYPE_FID {
        return Ok(Decoded::Skipped {
            header,
            reason: SkipReason::OtherInfo(info_header.info_type),
        });
    }

    let body = &info[INFO_HEADER_LEN..record_len];
    let handle = extract_handle(body)?;
    Ok(Decoded::Fid { header, handle })
}

fn read_info_header(cursor: &mut ByteCursor<'_>) -> Result<InfoHeader, DecodeError> {
    let malformed =
        |u: Underflow| DecodeError::MalformedInfo(format!("info header too short: {u}"));
    let info_type = cursor.read_u8().map_err(malformed)?;
    let _pad = cursor.read_u8().map_err(malformed)?;
    let len = cursor.read_u16().map_err(malformed)?;
    Ok(InfoHeader { info_type, len })
}
