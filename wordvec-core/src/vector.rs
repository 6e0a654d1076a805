//! Dense vector helpers shared by the table and the query engine.

/// Dot product of two equal-length slices
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm
///
/// Components are scaled by the largest magnitude before squaring, so large
/// and tiny vectors neither overflow nor underflow on the way. The result is
/// infinite only when the norm itself exceeds `f32::MAX`.
pub fn norm(a: &[f32]) -> f32 {
    let scale = a.iter().fold(0.0_f32, |m, x| m.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let sum: f32 = a
        .iter()
        .map(|x| {
            let y = x / scale;
            y * y
        })
        .sum();
    scale * sum.sqrt()
}

/// Unit-length copy of `a`, or `None` when `a` has zero magnitude
pub fn normalized(a: &[f32]) -> Option<Vec<f32>> {
    let n = norm(a);
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    Some(a.iter().map(|x| x / n).collect())
}

/// Calculate cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs. The result
/// is clamped to `[-1.0, 1.0]` to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return 0.0;
    }

    let score: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x / norm_a) * (y / norm_b))
        .sum();
    score.clamp(-1.0, 1.0)
}

/// `acc += scale * v`
pub(crate) fn add_scaled(acc: &mut [f32], v: &[f32], scale: f32) {
    for (a, x) in acc.iter_mut().zip(v.iter()) {
        *a += scale * x;
    }
}
