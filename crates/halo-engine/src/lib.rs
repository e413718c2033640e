//! Ghost-cell exchange engine for Halo.
//!
//! Ties the planner and the communicator together. [`GhostExchange`]
//! gathers every rank's owned extent, plans the transfers once, and moves
//! each selected point and cell array through the [`transfer`] executor.
//! [`GhostPipeline`] wraps it in the three-phase protocol a demand-driven
//! pipeline stage speaks.
//!
//! The engine is single-threaded per rank. Concurrency exists only across
//! ranks, through non-blocking sends and receives that are all posted
//! before the single wait of each exchange.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod pipeline;
pub mod scratch;
pub mod transfer;

pub use config::{ArraySelection, ConfigError, ExchangeConfig};
pub use error::ExchangeError;
pub use exchange::{ExchangePhase, FilledDataset, GhostExchange, SkippedArray};
pub use metrics::ExchangeMetrics;
pub use pipeline::{DomainInfo, GhostPipeline, UpstreamRequest};
pub use scratch::ScratchPool;
pub use transfer::{TransferExecutor, TransferRole};
