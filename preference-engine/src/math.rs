//! Dense vector utilities shared by the update algorithm.
//!
//! All functions operate on `&[f32]` slices and perform no I/O.
//! Dimension disagreements surface as [`UpdateError::DimensionMismatch`]
//! rather than panicking.

use crate::error::{UpdateError, UpdateResult};

/// Guard that two vectors agree on dimensionality.
pub fn ensure_dim(expected: usize, actual: usize) -> UpdateResult<()> {
    if expected != actual {
        return Err(UpdateError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> UpdateResult<f32> {
    ensure_dim(a.len(), b.len())?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Euclidean (L2) norm.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalize a vector to unit length in place.
///
/// A zero (or numerically zero) vector is left unchanged; there is no
/// meaningful direction to preserve.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Blend coefficient for mixing the behavioral signal into the profile.
///
/// `beta(n) = n / (n + 1)`: 0 for a user with no ratings, approaching 1
/// as the rating history grows, so the interest baseline dominates early
/// and accumulated behavior dominates late.
pub fn blend_weight(rating_count: u32) -> f32 {
    rating_count as f32 / (rating_count as f32 + 1.0)
}

/// Weighted blend `(1 - beta) * a + beta * b` of two equal-length vectors.
pub fn blend(a: &[f32], b: &[f32], beta: f32) -> UpdateResult<Vec<f32>> {
    ensure_dim(a.len(), b.len())?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| (1.0 - beta) * x + beta * y)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let result = dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert!((result - 32.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_dimension_mismatch() {
        let err = dot(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            UpdateError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_blend_weight_boundaries() {
        assert_eq!(blend_weight(0), 0.0);
        assert!((blend_weight(1) - 0.5).abs() < 1e-6);
        assert!((blend_weight(9) - 0.9).abs() < 1e-6);
        // Monotone non-decreasing
        let mut prev = 0.0;
        for n in 0..1000 {
            let beta = blend_weight(n);
            assert!(beta >= prev);
            prev = beta;
        }
        assert!(blend_weight(100_000) > 0.9999);
    }

    #[test]
    fn test_blend_endpoints() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert_eq!(blend(&a, &b, 0.0).unwrap(), vec![1.0, 0.0]);
        assert_eq!(blend(&a, &b, 1.0).unwrap(), vec![0.0, 1.0]);
        let mid = blend(&a, &b, 0.5).unwrap();
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert!((mid[1] - 0.5).abs() < 1e-6);
    }
}
