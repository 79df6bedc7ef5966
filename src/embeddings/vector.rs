// Vector math for similarity ranking.
//
// Everything here works on f64 slices. Normalization refuses vectors whose
// norm is zero, non-finite, or below NORM_EPSILON. Callers drop those rows
// instead of dividing by (nearly) zero.
//
// EmbeddingMatrix packs many same-dimension vectors into one row-major
// buffer so a query is scored against all of them in a single pass.

/// Norm floor below which a vector is treated as zero.
pub const NORM_EPSILON: f64 = 1e-8;

pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit L2 norm. `None` for empty, zero, or non-finite vectors.
pub fn normalize(v: &[f64]) -> Option<Vec<f64>> {
    let norm = l2_norm(v);
    if v.is_empty() || !norm.is_finite() || norm < NORM_EPSILON {
        return None;
    }
    Some(v.iter().map(|x| x / norm).collect())
}

/// Cosine similarity in [-1, 1] over the shared leading dimension.
///
/// Unlike a strict equal-length check, vectors of different lengths are
/// compared on their common prefix. Returns 0.0 when either side has no
/// usable direction.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    match (normalize(&a[..n]), normalize(&b[..n])) {
        (Some(a), Some(b)) => dot(&a, &b).clamp(-1.0, 1.0),
        _ => 0.0,
    }
}

/// Component-wise mean of several vectors.
///
/// Vectors may differ in length: each index is averaged over the vectors
/// that actually have it, so a short vector doesn't drag the tail towards
/// zero. Returns `None` for an empty input.
pub fn mean_embedding(vectors: &[Vec<f64>]) -> Option<Vec<f64>> {
    let dim = vectors.iter().map(Vec::len).max()?;
    if dim == 0 {
        return None;
    }

    let mut sums = vec![0.0_f64; dim];
    let mut counts = vec![0_u32; dim];
    for v in vectors {
        for (i, &x) in v.iter().enumerate() {
            sums[i] += x;
            counts[i] += 1;
        }
    }

    Some(
        sums.into_iter()
            .zip(counts)
            .map(|(s, c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect(),
    )
}

/// Row-major block of unit-norm vectors sharing one dimension, each tagged
/// with the id of the place that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dim: usize,
    data: Vec<f64>,
    owners: Vec<i64>,
}

impl EmbeddingMatrix {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
            owners: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owners(&self) -> &[i64] {
        &self.owners
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Normalize `v` and append it. Returns false (row dropped) when the
    /// length doesn't match or the vector has no direction.
    pub fn push(&mut self, owner: i64, v: &[f64]) -> bool {
        if v.len() != self.dim {
            return false;
        }
        match normalize(v) {
            Some(unit) => {
                self.data.extend_from_slice(&unit);
                self.owners.push(owner);
                true
            }
            None => false,
        }
    }

    /// Dot product of every row with `query`. `query` must already be unit
    /// norm and exactly `dim` long; the result is one score per row.
    /// A zero-width matrix never holds rows, so it scores nothing.
    pub fn dot_all(&self, query: &[f64]) -> Vec<f64> {
        if self.dim == 0 {
            return Vec::new();
        }
        debug_assert_eq!(query.len(), self.dim);
        self.data
            .chunks_exact(self.dim)
            .map(|row| dot(row, query).clamp(-1.0, 1.0))
            .collect()
    }

    /// A copy holding only the first `dim` components of each row,
    /// renormalized. Rows whose prefix has no direction are dropped.
    pub fn truncated(&self, dim: usize) -> EmbeddingMatrix {
        let mut out = EmbeddingMatrix::new(dim);
        if dim == 0 || dim > self.dim {
            return out;
        }
        for (i, &owner) in self.owners.iter().enumerate() {
            out.push(owner, &self.row(i)[..dim]);
        }
        out
    }
}
