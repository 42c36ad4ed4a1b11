//! Cosine similarity over f64 vectors.

/// Cosine similarity `dot(a, b) / (|a| * |b|)`, in `[-1, 1]`.
///
/// If either norm is exactly zero the result is `0.0`: a zero vector has no
/// direction and scores as "no similarity" rather than an error.
/// Vectors of different length also score `0.0`; stored vectors can never
/// disagree because the store enforces one dimension per collection.
///
/// Each vector is divided by its largest absolute component before summing,
/// so finite inputs near the edges of the f64 range neither overflow to
/// infinity nor underflow to zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "vector length mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // Scaled norms are at least 1; rounding can still push past +-1.
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0f64, |m, x| m.max(x.abs()))
}

/// Euclidean norm of a vector, computed without intermediate overflow.
pub fn l2_norm(v: &[f64]) -> f64 {
    let scale = max_abs(v);
    if scale == 0.0 {
        return 0.0;
    }
    scale * v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt()
}
