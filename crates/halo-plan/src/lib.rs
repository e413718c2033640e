//! Ghost-transaction planning for Halo.
//!
//! Given every rank's owned extent, the problem domain, and a ghost width,
//! [`plan_transactions`] computes the complete list of pairwise transfers
//! that fills every rank's ghost region. The planner is a pure function of
//! its inputs: every rank runs it on the same gathered extents and arrives
//! at the same [`TransactionPlan`], transaction ids included, so sends and
//! receives match without a handshake.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod plan;
pub mod transaction;

pub use error::PlanError;
pub use hash::Fnv1a;
pub use plan::{plan_transactions, TransactionPlan};
pub use transaction::GhostTransaction;
