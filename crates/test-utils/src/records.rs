use std::io::Cursor;

use fanwatch::abi::{
    EVENT_METADATA_LEN, FAN_EVENT_INFO_TYPE_FID, FAN_NOFD, FAN_Q_OVERFLOW,
    FANOTIFY_METADATA_VERSION, INFO_HEADER_LEN,
};

/// Builder for synthetic fanotify records laid out exactly as the kernel
/// writes them in `FAN_REPORT_FID` mode.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    mask: u64,
    pid: i32,
    fd: i32,
    version: u8,
    metadata_len: u16,
    event_len: Option<u32>,
    info_type: u8,
    fsid: [i32; 2],
    handle_type: i32,
    handle: Vec<u8>,
    declared_handle_len: Option<u32>,
    with_info: bool,
}

impl RecordBuilder {
    /// A FID record for `mask` whose object handle is `handle`.
    pub fn fid(mask: u64, handle: impl Into<Vec<u8>>) -> Self {
        Self {
            mask,
            pid: 4242,
            fd: FAN_NOFD,
            version: FANOTIFY_METADATA_VERSION,
            metadata_len: EVENT_METADATA_LEN as u16,
            event_len: None,
            info_type: FAN_EVENT_INFO_TYPE_FID,
            fsid: [0x1234, 0x5678],
            handle_type: 1,
            handle: handle.into(),
            declared_handle_len: None,
            with_info: true,
        }
    }

    /// A queue-overflow notification: header only.
    pub fn overflow() -> Self {
        let mut b = Self::fid(FAN_Q_OVERFLOW, Vec::new());
        b.with_info = false;
        b
    }

    pub fn info_type(mut self, info_type: u8) -> Self {
        self.info_type = info_type;
        self
    }

    /// Claim a handle length different from the bytes actually written.
    pub fn declared_handle_len(mut self, len: u32) -> Self {
        self.declared_handle_len = Some(len);
        self
    }

    pub fn handle_type(mut self, handle_type: i32) -> Self {
        self.handle_type = handle_type;
        self
    }

    pub fn pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    /// Descriptor number carried in the header. Defaults to `FAN_NOFD`.
    pub fn fd(mut self, fd: i32) -> Self {
        self.fd = fd;
        self
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Header-declared metadata length. Values above 24 insert zero padding
    /// between the header and the info section.
    pub fn metadata_len(mut self, len: u16) -> Self {
        self.metadata_len = len;
        self
    }

    /// Override the header-declared total length.
    pub fn event_len(mut self, len: u32) -> Self {
        self.event_len = Some(len);
        self
    }

    pub fn without_info(mut self) -> Self {
        self.with_info = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let info = if self.with_info {
            self.info_bytes()
        } else {
            Vec::new()
        };
        let extra = (self.metadata_len as usize).saturating_sub(EVENT_METADATA_LEN);
        let event_len = self
            .event_len
            .unwrap_or((EVENT_METADATA_LEN + extra + info.len()) as u32);

        let mut out = Vec::with_capacity(event_len as usize);
        out.extend_from_slice(&event_len.to_ne_bytes());
        out.push(self.version);
        out.push(0);
        out.extend_from_slice(&self.metadata_len.to_ne_bytes());
        out.extend_from_slice(&self.mask.to_ne_bytes());
        out.extend_from_slice(&self.fd.to_ne_bytes());
        out.extend_from_slice(&self.pid.to_ne_bytes());
        out.resize(out.len() + extra, 0);
        out.extend_from_slice(&info);
        out
    }

    fn info_bytes(&self) -> Vec<u8> {
        let declared = self
            .declared_handle_len
            .unwrap_or(self.handle.len() as u32);

        let mut body = Vec::new();
        body.extend_from_slice(&self.fsid[0].to_ne_bytes());
        body.extend_from_slice(&self.fsid[1].to_ne_bytes());
        body.extend_from_slice(&declared.to_ne_bytes());
        body.extend_from_slice(&self.handle_type.to_ne_bytes());
        body.extend_from_slice(&self.handle);

        // Records are padded to 4-byte alignment.
        let record_len = (INFO_HEADER_LEN + body.len()).next_multiple_of(4);
        body.resize(record_len - INFO_HEADER_LEN, 0);

        let mut info = Vec::with_capacity(record_len);
        info.push(self.info_type);
        info.push(0);
        info.extend_from_slice(&(record_len as u16).to_ne_bytes());
        info.extend_from_slice(&body);
        info
    }
}

/// Concatenate records into a readable stream.
pub fn stream<I>(records: I) -> Cursor<Vec<u8>>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    Cursor::new(records.into_iter().flatten().collect())
}
