//! In-process multi-rank communicator over crossbeam channels.
//!
//! Each rank owns one unbounded inbox. A receive first looks in the rank's
//! mailbox of early arrivals, then drains the inbox, stashing every
//! message that does not match until the wanted one shows up. Sends never
//! block, so posting every send before waiting on any receive cannot
//! deadlock.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use halo_core::Rank;
use tracing::{debug, trace};

use crate::error::CommError;
use crate::mailbox::{check_len, Mailbox};
use crate::request::{Completion, RecvRequest, SendRequest};
use crate::tag::Tag;
use crate::Communicator;

#[derive(Debug)]
struct Envelope {
    source: Rank,
    tag: Tag,
    payload: Vec<u8>,
}

/// One rank of an in-process world. Create a whole world with
/// [`ThreadComm::world`] and move each endpoint onto its own thread.
///
/// # Examples
///
/// ```
/// use halo_comm::{Communicator, ThreadComm};
///
/// let world = ThreadComm::world(3);
/// let gathered: Vec<Vec<Vec<u8>>> = std::thread::scope(|s| {
///     let handles: Vec<_> = world
///         .into_iter()
///         .map(|comm| s.spawn(move || comm.all_gather_bytes(&[comm.rank().0 as u8]).unwrap()))
///         .collect();
///     handles.into_iter().map(|h| h.join().unwrap()).collect()
/// });
/// for g in gathered {
///     assert_eq!(g, vec![vec![0], vec![1], vec![2]]);
/// }
/// ```
#[derive(Debug)]
pub struct ThreadComm {
    rank: Rank,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    mailbox: Mailbox,
    collective_seq: Cell<u64>,
    timeout: Option<Duration>,
}

impl ThreadComm {
    /// Create `size` connected endpoints, indexed by rank.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| crossbeam_channel::unbounded()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank: Rank(rank),
                peers: senders.clone(),
                inbox,
                mailbox: Mailbox::default(),
                collective_seq: Cell::new(0),
                timeout: None,
            })
            .collect()
    }

    /// Fail receives that wait longer than `timeout` with
    /// [`CommError::Timeout`] instead of blocking forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Messages that arrived but have not been matched by a receive yet.
    pub fn pending_messages(&self) -> usize {
        self.mailbox.len() + self.inbox.len()
    }

    fn post(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), CommError> {
        self.check_rank(dest)?;
        trace!(rank = %self.rank, %dest, %tag, len = payload.len(), "send");
        self.peers[dest.0]
            .send(Envelope {
                source: self.rank,
                tag,
                payload,
            })
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn receive(&self, source: Rank, tag: Tag) -> Result<Vec<u8>, CommError> {
        if let Some(payload) = self.mailbox.take(source, tag) {
            return Ok(payload);
        }
        let start = Instant::now();
        loop {
            let env = match self.timeout {
                None => self
                    .inbox
                    .recv()
                    .map_err(|_| CommError::Disconnected { peer: source })?,
                Some(limit) => match self.inbox.recv_timeout(limit.saturating_sub(start.elapsed())) {
                    Ok(env) => env,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(CommError::Timeout {
                            source,
                            tag,
                            waited: start.elapsed(),
                        })
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(CommError::Disconnected { peer: source })
                    }
                },
            };
            if env.source == source && env.tag == tag {
                trace!(rank = %self.rank, %source, %tag, len = env.payload.len(), "recv");
                return Ok(env.payload);
            }
            self.mailbox.push(env.source, env.tag, env.payload);
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn isend(&self, dest: Rank, tag: Tag, payload: &[u8]) -> Result<SendRequest, CommError> {
        self.post(dest, tag, payload.to_vec())?;
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
        // Channel sends are complete once posted.
        for send in &sends {
            self.check_rank(send.dest)?;
        }
        let payloads = recvs
            .iter()
            .map(|req| check_len(req, self.receive(req.source, req.tag)?))
            .collect::<Result<_, _>>()?;
        trace!(rank = %self.rank, sends = sends.len(), recvs = recvs.len(), "wait-all done");
        Ok(Completion {
            sends: sends.len(),
            payloads,
        })
    }

    fn all_gather_bytes(&self, local: &[u8]) -> Result<Vec<Vec<u8>>, CommError> {
        let seq = self.collective_seq.get();
        self.collective_seq.set(seq + 1);
        let tag = Tag::collective(seq);
        debug!(rank = %self.rank, seq, len = local.len(), "all-gather");

        for dest in (0..self.size()).map(Rank).filter(|&r| r != self.rank) {
            self.post(dest, tag, local.to_vec())?;
        }
        (0..self.size())
            .map(Rank)
            .map(|source| {
                if source == self.rank {
                    Ok(local.to_vec())
                } else {
                    self.receive(source, tag)
                }
            })
            .collect()
    }
}
