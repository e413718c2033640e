//! Per-exchange counters.
//!
//! [`ExchangeMetrics`] describes a single exchange. Durations are in
//! microseconds.

/// Counters and timings collected during one exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeMetrics {
    /// Transactions in the global plan.
    pub transactions_planned: usize,
    /// Sends this rank posted, across all arrays.
    pub sends_posted: usize,
    /// Sends the final wait reported complete. Equals `sends_posted`
    /// after a successful exchange.
    pub sends_completed: usize,
    /// Receives this rank posted, across all arrays.
    pub receives_posted: usize,
    /// Payload bytes sent.
    pub bytes_sent: usize,
    /// Payload bytes received.
    pub bytes_received: usize,
    /// Arrays copied into the output.
    pub arrays_exchanged: usize,
    /// Arrays skipped for an unsupported element type.
    pub arrays_skipped: usize,
    /// Largest single packed message, in bytes.
    pub scratch_high_water: usize,
    /// Time spent in the extent all-gather, in microseconds.
    pub gather_us: u64,
    /// Time spent blocked in the final wait, in microseconds.
    pub wait_us: u64,
    /// Wall-clock time for the whole exchange, in microseconds.
    pub total_us: u64,
}
