//! Single-rank communicator.

use halo_core::Rank;
use tracing::trace;

use crate::error::CommError;
use crate::mailbox::{check_len, Mailbox};
use crate::request::{Completion, RecvRequest, SendRequest};
use crate::tag::Tag;
use crate::Communicator;

/// A world containing only rank 0.
///
/// The planner never produces self-transfers, so in practice an exchange
/// over `SerialComm` posts no messages at all. Self-sends are still
/// honoured through a local mailbox.
#[derive(Debug, Default)]
pub struct SerialComm {
    mailbox: Mailbox,
}

impl SerialComm {
    /// Create a single-rank world.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Communicator for SerialComm {
    fn rank(&self) -> Rank {
        Rank(0)
    }

    fn size(&self) -> usize {
        1
    }

    fn isend(&self, dest: Rank, tag: Tag, payload: &[u8]) -> Result<SendRequest, CommError> {
        self.check_rank(dest)?;
        trace!(%tag, len = payload.len(), "self-send");
        self.mailbox.push(dest, tag, payload.to_vec());
        Ok(SendRequest {
            dest,
            tag,
            len: payload.len(),
        })
    }

    fn irecv(&self, source: Rank, tag: Tag, len: usize) -> Result<RecvRequest, CommError> {
        self.check_rank(source)?;
        Ok(RecvRequest { source, tag, len })
    }

    fn wait_all(
        &self,
        sends: Vec<SendRequest>,
        recvs: Vec<RecvRequest>,
    ) -> Result<Completion, CommError> {
        for send in &sends {
            self.check_rank(send.dest)?;
        }
        let payloads = recvs
            .iter()
            .map(|req| {
                // Nothing else can ever deliver; a missing message is a
                // receive with no matching send.
                let payload = self.mailbox.take(req.source, req.tag).ok_or(
                    CommError::Disconnected { peer: req.source },
                )?;
                check_len(req, payload)
            })
            .collect::<Result<_, _>>()?;
        Ok(Completion {
            sends: sends.len(),
            payloads,
        })
    }

    fn all_gather_bytes(&self, local: &[u8]) -> Result<Vec<Vec<u8>>, CommError> {
        Ok(vec![local.to_vec()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_gather_returns_local() {
        let comm = SerialComm::new();
        assert_eq!(comm.all_gather_bytes(&[4, 2]).unwrap(), vec![vec![4, 2]]);
    }

    #[test]
    fn other_ranks_rejected() {
        let comm = SerialComm::new();
        assert!(matches!(
            comm.isend(Rank(1), Tag(0), &[]),
            Err(CommError::InvalidRank { size: 1, .. })
        ));
        assert!(comm.irecv(Rank(3), Tag(0), 0).is_err());
    }

    #[test]
    fn self_send_delivers() {
        let comm = SerialComm::new();
        let s = comm.isend(Rank(0), Tag(1), &[9, 9]).unwrap();
        let r = comm.irecv(Rank(0), Tag(1), 2).unwrap();
        let done = comm.wait_all(vec![s], vec![r]).unwrap();
        assert_eq!(done.sends, 1);
        assert_eq!(done.payloads, vec![vec![9, 9]]);
    }

    #[test]
    fn unmatched_receive_fails_instead_of_hanging() {
        let comm = SerialComm::new();
        let r = comm.irecv(Rank(0), Tag(1), 2).unwrap();
        assert!(comm.wait_all(Vec::new(), vec![r]).is_err());
    }
}
