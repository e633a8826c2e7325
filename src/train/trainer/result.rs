//! Training result types

/// Result of a fit run
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Best evaluation correct-count seen (−1 if no evaluation ran)
    pub best_correct: i64,
    /// Final epoch's mean clean loss
    pub final_loss: f32,
    /// Epochs actually run
    pub epochs: usize,
    /// Whether a callback stopped training early
    pub stopped_early: bool,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}
