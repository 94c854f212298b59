/// One finalized measurement, emitted by the estimator once per tick.
///
/// Rates are in KB/s, the downloaded size in KB. A `Sample` is immutable once
/// built and moves by value through the queue: the producer gives up ownership
/// on push, the consumer takes it on pop.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since the transfer started.
    pub time: f64,
    pub cumulative_kb: f64,
    /// Transport-reported average rate over the whole transfer so far.
    pub avg_kbs: f64,
    /// Trailing 1-second windowed rate estimate.
    pub window_kbs: f64,
}
