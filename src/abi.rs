// src/abi.rs

//! Kernel ABI constants for fanotify in file-identifier mode.
//!
//! Values mirror `<linux/fanotify.h>`; they are spelled out here so the
//! decoder does not depend on which constants a given `libc` release exports.

// fanotify_init flags
pub const FAN_CLOEXEC: u32 = 0x0000_0001;
pub const FAN_CLASS_NOTIF: u32 = 0x0000_0000;
pub const FAN_REPORT_FID: u32 = 0x0000_0200;

// fanotify_mark flags
pub const FAN_MARK_ADD: u32 = 0x0000_0001;
pub const FAN_MARK_FILESYSTEM: u32 = 0x0000_0100;

// Event bits
pub const FAN_MODIFY: u64 = 0x0000_0002;
pub const FAN_MOVED_FROM: u64 = 0x0000_0040;
pub const FAN_MOVED_TO: u64 = 0x0000_0080;
pub const FAN_CREATE: u64 = 0x0000_0100;
pub const FAN_DELETE: u64 = 0x0000_0200;
pub const FAN_Q_OVERFLOW: u64 = 0x0000_4000;
pub const FAN_ONDIR: u64 = 0x4000_0000;

/// Events requested for the filesystem-wide mark.
pub const MARK_MASK: u64 =
    FAN_ONDIR | FAN_MOVED_FROM | FAN_MOVED_TO | FAN_CREATE | FAN_DELETE | FAN_MODIFY;

/// Flags used when installing the mark.
pub const MARK_FLAGS: u32 = FAN_MARK_ADD | FAN_MARK_FILESYSTEM;

/// Flags used when opening the notification group.
pub const INIT_FLAGS: u32 = FAN_CLASS_NOTIF | FAN_REPORT_FID | FAN_CLOEXEC;

pub const FANOTIFY_METADATA_VERSION: u8 = 3;

/// `fd` value the kernel reports when no event descriptor accompanies a record.
pub const FAN_NOFD: i32 = -1;

// Info record types
pub const FAN_EVENT_INFO_TYPE_FID: u8 = 1;

/// Size of `struct fanotify_event_metadata`.
pub const EVENT_METADATA_LEN: usize = 24;

/// Size of `struct fanotify_event_info_header`.
pub const INFO_HEADER_LEN: usize = 4;

/// Size of `__kernel_fsid_t`.
pub const FSID_LEN: usize = 8;

/// Size of the fixed part of `struct file_handle` (`handle_bytes` + `handle_type`).
pub const FILE_HANDLE_HEADER_LEN: usize = 8;

// Capability bits, as laid out in `CapEff` of /proc/<pid>/status.
pub const CAP_DAC_READ_SEARCH: u32 = 2;
pub const CAP_SYS_ADMIN: u32 = 21;
