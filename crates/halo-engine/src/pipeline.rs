//! Boundary to a demand-driven pipeline.
//!
//! A pipeline stage that wants ghost layers talks to the engine in three
//! phases. Each phase returns a value the next one consumes, so nothing
//! is cached on the stage between callbacks:
//!
//! 1. [`request_information`](GhostPipeline::request_information)
//!    validates the configuration and yields a [`DomainInfo`].
//! 2. [`request_update_extent`](GhostPipeline::request_update_extent)
//!    turns the ghost-inclusive extent the consumer wants into the
//!    smaller [`UpstreamRequest`] the producer must fill.
//! 3. [`execute`](GhostPipeline::execute) runs the exchange on the
//!    produced piece and grows it back out.

use halo_comm::Communicator;
use halo_core::DataSet;
use halo_extent::{CartesianExtent, Centering, DimensionMode, ExtentError};
use tracing::debug;

use crate::config::{ConfigError, ExchangeConfig};
use crate::error::ExchangeError;
use crate::exchange::{FilledDataset, GhostExchange};
use crate::scratch::ScratchPool;

/// Result of the information phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainInfo {
    config: ExchangeConfig,
    mode: DimensionMode,
}

impl DomainInfo {
    /// The validated configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Node extent of the whole domain.
    pub fn whole_extent(&self) -> CartesianExtent {
        self.config.whole_extent
    }

    /// Dimension mode of the domain.
    pub fn mode(&self) -> DimensionMode {
        self.mode
    }
}

/// Result of the update-extent phase: what to ask the producer for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamRequest {
    info: DomainInfo,
    downstream: CartesianExtent,
    extent: CartesianExtent,
}

impl UpstreamRequest {
    /// Node extent the producer must compute for this rank.
    pub fn extent(&self) -> CartesianExtent {
        self.extent
    }

    /// The ghost-inclusive extent originally requested, clipped to the
    /// whole extent.
    pub fn downstream(&self) -> CartesianExtent {
        self.downstream
    }

    /// Information the request was derived from.
    pub fn info(&self) -> &DomainInfo {
        &self.info
    }
}

/// Pipeline-facing driver of [`GhostExchange`].
///
/// Keeps only the pack buffer between executions.
#[derive(Debug, Default)]
pub struct GhostPipeline {
    scratch: ScratchPool,
}

impl GhostPipeline {
    /// Create a pipeline adapter with an empty pack buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack buffer carried between executions.
    pub fn scratch(&self) -> &ScratchPool {
        &self.scratch
    }

    /// Information phase: validate `config` and derive the domain's
    /// dimension mode. Runs before any communication.
    pub fn request_information(&self, config: ExchangeConfig) -> Result<DomainInfo, ConfigError> {
        let mode = config.validate()?;
        debug!(whole = %config.whole_extent, %mode, ghost_levels = config.ghost_levels, "domain information");
        Ok(DomainInfo { config, mode })
    }

    /// Update-extent phase: shrink the consumer's node request by the
    /// ghost levels, leaving faces on the domain boundary in place.
    ///
    /// The exchange grows the produced piece back to the clipped request.
    pub fn request_update_extent(
        &self,
        info: &DomainInfo,
        downstream: CartesianExtent,
    ) -> Result<UpstreamRequest, ConfigError> {
        if downstream.centering() != Centering::Node {
            return Err(ExtentError::AlreadyCellCentered { extent: downstream }.into());
        }
        let mode = info.mode;
        mode.check(&downstream)
            .map_err(|_| ConfigError::DimensionMismatch {
                mode,
                extent: downstream,
            })?;
        let whole = info.whole_extent();
        let clipped = downstream & whole;
        let extent = clipped.shrink(&whole, info.config.ghost_width(), mode)?;
        debug!(%downstream, upstream = %extent, "update extent");
        Ok(UpstreamRequest {
            info: info.clone(),
            downstream: clipped,
            extent,
        })
    }

    /// Execute phase: exchange ghosts for `input`, which must cover
    /// exactly the upstream request.
    ///
    /// Collective over `comm`.
    pub fn execute<C: Communicator + ?Sized>(
        &mut self,
        comm: &C,
        upstream: &UpstreamRequest,
        input: &DataSet,
    ) -> Result<FilledDataset, ExchangeError> {
        let found = input.extent();
        let expected = upstream.extent;
        let precheck = if found != expected && !(found.is_empty() && expected.is_empty()) {
            Err(ConfigError::UnexpectedInput { expected, found }.into())
        } else {
            Ok(())
        };
        // The check rides through the exchange so peers fail with us.
        let mut exchange = GhostExchange::new(upstream.info.config.clone())?
            .with_scratch(std::mem::take(&mut self.scratch));
        let result = exchange.exchange_checked(comm, input, precheck);
        self.scratch = exchange.into_scratch();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_comm::SerialComm;
    use halo_core::FieldArray;
    use halo_extent::Axis;

    fn info(levels: i32) -> DomainInfo {
        let cfg = ExchangeConfig::new(CartesianExtent::node([0, 20, 0, 10, 0, 0]), levels);
        GhostPipeline::new().request_information(cfg).unwrap()
    }

    #[test]
    fn information_derives_mode() {
        assert_eq!(info(1).mode(), DimensionMode::TwoD { normal: Axis::Z });
    }

    #[test]
    fn information_rejects_bad_config() {
        let cfg = ExchangeConfig::new(CartesianExtent::node([0, 20, 0, 10, 0, 0]), -2);
        assert!(GhostPipeline::new().request_information(cfg).is_err());
    }

    #[test]
    fn update_extent_shrinks_interior_faces_only() {
        let p = GhostPipeline::new();
        let req = p
            .request_update_extent(&info(2), CartesianExtent::node([0, 12, 3, 10, 0, 0]))
            .unwrap();
        assert_eq!(req.extent().bounds(), [0, 10, 5, 10, 0, 0]);
    }

    #[test]
    fn update_extent_clips_to_whole() {
        let p = GhostPipeline::new();
        let req = p
            .request_update_extent(&info(1), CartesianExtent::node([-5, 30, 0, 10, 0, 0]))
            .unwrap();
        assert_eq!(req.downstream().bounds(), [0, 20, 0, 10, 0, 0]);
        assert_eq!(req.extent().bounds(), [0, 20, 0, 10, 0, 0]);
    }

    #[test]
    fn update_extent_rejects_cell_and_off_mode_requests() {
        let p = GhostPipeline::new();
        let i = info(1);
        assert!(p
            .request_update_extent(&i, CartesianExtent::cell([0, 5, 0, 5, 0, 0]))
            .is_err());
        assert!(matches!(
            p.request_update_extent(&i, CartesianExtent::node([0, 5, 0, 5, 0, 2])),
            Err(ConfigError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn update_extent_collapse_is_an_error() {
        let p = GhostPipeline::new();
        assert!(matches!(
            p.request_update_extent(&info(2), CartesianExtent::node([5, 7, 0, 10, 0, 0])),
            Err(ConfigError::Extent(ExtentError::Collapsed { axis: Axis::X, .. }))
        ));
    }

    #[test]
    fn execute_checks_input_extent() {
        let mut p = GhostPipeline::new();
        let req = p
            .request_update_extent(&info(1), CartesianExtent::node([0, 20, 0, 10, 0, 0]))
            .unwrap();
        let wrong = DataSet::new(CartesianExtent::node([0, 19, 0, 10, 0, 0])).unwrap();
        assert!(matches!(
            p.execute(&SerialComm::new(), &req, &wrong),
            Err(ExchangeError::Config(ConfigError::UnexpectedInput { .. }))
        ));
    }

    #[test]
    fn execute_single_rank_round_trip() {
        let mut p = GhostPipeline::new();
        let whole = CartesianExtent::node([0, 20, 0, 10, 0, 0]);
        let req = p.request_update_extent(&info(1), whole).unwrap();
        let mut input = DataSet::new(req.extent()).unwrap();
        input
            .point_data
            .insert(FieldArray::from_values("t", 1, vec![7u64; whole.volume()]).unwrap());
        let out = p.execute(&SerialComm::new(), &req, &input).unwrap();
        assert_eq!(out.extent, whole);
        assert_eq!(out.ghost_levels, 1);
        assert_eq!(out.point_data.get("t"), input.point_data.get("t"));
    }
}
