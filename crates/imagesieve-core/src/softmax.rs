//! Softmax normalization for raw model logits

/// Normalize a slice of logits into a probability distribution.
///
/// Subtracts the maximum logit before exponentiating, so large-magnitude
/// inputs do not overflow. The transform is monotonic: input rank order is
/// preserved in the output. An empty slice yields an empty vector; a single
/// logit yields `[1.0]`.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}
