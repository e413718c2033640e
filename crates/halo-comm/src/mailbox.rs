//! Out-of-order message stash shared by the in-process backends.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use halo_core::Rank;

use crate::error::CommError;
use crate::request::RecvRequest;
use crate::tag::Tag;

/// Messages that arrived before anyone asked for them, queued per
/// `(source, tag)` so same-key messages keep their send order.
#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    stash: RefCell<HashMap<(Rank, Tag), VecDeque<Vec<u8>>>>,
}

impl Mailbox {
    pub(crate) fn push(&self, source: Rank, tag: Tag, payload: Vec<u8>) {
        self.stash
            .borrow_mut()
            .entry((source, tag))
            .or_default()
            .push_back(payload);
    }

    pub(crate) fn take(&self, source: Rank, tag: Tag) -> Option<Vec<u8>> {
        let mut stash = self.stash.borrow_mut();
        let queue = stash.get_mut(&(source, tag))?;
        let payload = queue.pop_front();
        if queue.is_empty() {
            stash.remove(&(source, tag));
        }
        payload
    }

    pub(crate) fn len(&self) -> usize {
        self.stash.borrow().values().map(VecDeque::len).sum()
    }
}

/// Check a delivered payload against the size its receive was posted for.
pub(crate) fn check_len(req: &RecvRequest, payload: Vec<u8>) -> Result<Vec<u8>, CommError> {
    if payload.len() != req.len {
        return Err(CommError::PayloadMismatch {
            source: req.source,
            tag: req.tag,
            expected: req.len,
            actual: payload.len(),
        });
    }
    Ok(payload)
}
