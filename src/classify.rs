// src/classify.rs

use crate::abi::{FAN_CREATE, FAN_DELETE, FAN_MODIFY, FAN_MOVED_FROM, FAN_MOVED_TO};
use crate::event::ChangeKind;

/// Map an event mask to a [`ChangeKind`].
///
/// Checks run in a fixed order and each later match overwrites the earlier
/// one: create/moved-to, then delete/moved-from, then modify. A mask carrying
/// both create and modify therefore classifies as `Modify`, and one carrying
/// create and delete as `Delete`. Consumers rely on this order.
///
/// A mask with none of these bits yields `Create`.
pub fn classify(mask: u64) -> ChangeKind {
    let mut kind = ChangeKind::Create;

    if mask & (FAN_CREATE | FAN_MOVED_TO) != 0 {
        kind = ChangeKind::Create;
    }
    if mask & (FAN_DELETE | FAN_MOVED_FROM) != 0 {
        kind = ChangeKind::Delete;
    }
    if mask & FAN_MODIFY != 0 {
        kind = ChangeKind::Modify;
    }

    kind
}
