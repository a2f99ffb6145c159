//! Exact (brute-force) nearest-neighbor index under squared L2 distance.

use std::cmp::Ordering;

use rkyv::{Archive, Deserialize, Serialize};

use super::VectorDbError;
use crate::constants::validate_embedding_dim;

/// One search result: the vector's insertion id and its squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Dense id; equals the position of the vector in insertion order.
    pub id: usize,
    /// Squared L2 distance.
    pub distance: f32,
}

/// Append-only flat index. Vectors are stored row-major in one buffer.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: u32,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Result<Self, VectorDbError> {
        if dimension == 0 {
            return Err(VectorDbError::ZeroDimension);
        }
        let dimension = u32::try_from(dimension).map_err(|_| VectorDbError::InvalidDimension {
            expected: u32::MAX as usize,
            actual: dimension,
        })?;
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension as usize
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_dim(&self, vector: &[f32]) -> Result<(), VectorDbError> {
        validate_embedding_dim(self.dimension(), vector.len()).map_err(|_| {
            VectorDbError::InvalidDimension {
                expected: self.dimension(),
                actual: vector.len(),
            }
        })
    }

    /// Appends a vector and returns its id.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, VectorDbError> {
        self.check_dim(vector)?;
        let id = self.len();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// Appends vectors in order. Nothing is added unless every vector has the right dimension.
    pub fn add_all<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<(), VectorDbError> {
        for v in vectors {
            self.check_dim(v.as_ref())?;
        }
        self.data.reserve(vectors.len() * self.dimension());
        for v in vectors {
            self.data.extend_from_slice(v.as_ref());
        }
        Ok(())
    }

    /// `true` when the buffer holds a whole number of non-empty rows.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.dimension > 0 && self.data.len() % self.dimension() == 0
    }

    /// Returns the stored vector for `id`.
    pub fn vector(&self, id: usize) -> Option<&[f32]> {
        let dim = self.dimension();
        self.data.get(id * dim..(id + 1) * dim)
    }

    /// The `k` closest vectors, ascending by distance. Equal distances keep id order.
    ///
    /// Returns fewer than `k` results when the index is smaller; `k == 0` returns none.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorDbError> {
        self.check_dim(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension())
            .enumerate()
            .map(|(id, row)| Neighbor {
                id,
                distance: squared_l2(query, row),
            })
            .collect();

        let by_distance = |a: &Neighbor, b: &Neighbor| -> Ordering {
            a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id))
        };

        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, by_distance);
            neighbors.truncate(k);
        }
        neighbors.sort_by(by_distance);
        Ok(neighbors)
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
