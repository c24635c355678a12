//! Agglomerative hierarchical clustering over a condensed distance vector.
//!
//! The output mirrors the usual linkage matrix: merge `k` creates cluster
//! `n + k` from two existing clusters (leaves are `0..n`), and records the
//! smaller id first. Distances between a new cluster and the remaining ones
//! come from the Lance-Williams update of the chosen method.

use crate::libs::error::{GlobalignError, Result};
use std::fmt;
use std::str::FromStr;

/// Index of a leaf (`< n`) or of a merged cluster (`>= n`)
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Single,
    Complete,
    Average,
    Weighted,
    Centroid,
    Median,
    Ward,
}

impl FromStr for Method {
    type Err = GlobalignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Method::Single),
            "complete" => Ok(Method::Complete),
            "average" | "upgma" => Ok(Method::Average),
            "weighted" | "wpgma" => Ok(Method::Weighted),
            "centroid" => Ok(Method::Centroid),
            "median" => Ok(Method::Median),
            "ward" => Ok(Method::Ward),
            _ => Err(GlobalignError::config(
                "method",
                format!("unknown linkage method \"{}\"", s),
            )),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Single => "single",
            Method::Complete => "complete",
            Method::Average => "average",
            Method::Weighted => "weighted",
            Method::Centroid => "centroid",
            Method::Median => "median",
            Method::Ward => "ward",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub left: NodeId,
    pub right: NodeId,
    pub distance: f64,
    /// Number of leaves under the new cluster
    pub size: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dendrogram {
    pub n_leaves: usize,
    pub merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn root(&self) -> Option<NodeId> {
        match (self.n_leaves, self.merges.len()) {
            (0, _) => None,
            (_, 0) => Some(0),
            (n, m) => Some(n + m - 1),
        }
    }
}

/// A hierarchical clustering routine.
pub trait Clusterer {
    fn linkage(&self, condensed: &[f64], method: Method) -> Result<Dendrogram>;

    /// Leaf indices in dendrogram order
    fn leaves_list(&self, dendrogram: &Dendrogram) -> Vec<usize>;
}

/// Naive O(n^3) agglomeration with Lance-Williams distance updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanceWilliams;

/// Number of observations behind a condensed vector of length `len`.
pub fn num_obs(len: usize) -> Result<usize> {
    let n = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    if n * (n - 1) / 2 != len {
        return Err(GlobalignError::InvalidInput(format!(
            "condensed distance vector of length {} is not n(n-1)/2",
            len
        )));
    }
    Ok(n)
}

fn update(method: Method, d_ki: f64, d_kj: f64, d_ij: f64, n_i: f64, n_j: f64, n_k: f64) -> f64 {
    match method {
        Method::Single => d_ki.min(d_kj),
        Method::Complete => d_ki.max(d_kj),
        Method::Average => (n_i * d_ki + n_j * d_kj) / (n_i + n_j),
        Method::Weighted => (d_ki + d_kj) / 2.0,
        Method::Centroid => {
            let n = n_i + n_j;
            ((n_i * d_ki * d_ki + n_j * d_kj * d_kj) / n - n_i * n_j * d_ij * d_ij / (n * n))
                .max(0.0)
                .sqrt()
        }
        Method::Median => (d_ki * d_ki / 2.0 + d_kj * d_kj / 2.0 - d_ij * d_ij / 4.0)
            .max(0.0)
            .sqrt(),
        Method::Ward => {
            let t = n_i + n_j + n_k;
            (((n_i + n_k) * d_ki * d_ki + (n_j + n_k) * d_kj * d_kj - n_k * d_ij * d_ij) / t)
                .max(0.0)
                .sqrt()
        }
    }
}

impl Clusterer for LanceWilliams {
    fn linkage(&self, condensed: &[f64], method: Method) -> Result<Dendrogram> {
        let n = num_obs(condensed.len())?;
        if let Some(d) = condensed.iter().find(|d| !d.is_finite()) {
            return Err(GlobalignError::InvalidInput(format!(
                "distance {} is not finite",
                d
            )));
        }

        // Square working matrix over slots; slot i holds cluster ids[i]
        let mut dist = vec![0.0; n * n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                dist[i * n + j] = condensed[k];
                dist[j * n + i] = condensed[k];
                k += 1;
            }
        }
        let mut ids: Vec<NodeId> = (0..n).collect();
        let mut sizes: Vec<usize> = vec![1; n];
        let mut active: Vec<usize> = (0..n).collect();

        let mut merges = Vec::with_capacity(n.saturating_sub(1));

        while active.len() > 1 {
            // 1. Closest pair, lowest slots on ties
            let mut min_dist = f64::MAX;
            let mut pair = (0, 0);
            for (a, &i) in active.iter().enumerate() {
                for &j in &active[a + 1..] {
                    let d = dist[i * n + j];
                    if d < min_dist {
                        min_dist = d;
                        pair = (i, j);
                    }
                }
            }
            let (i, j) = pair;

            // 2. Record the merge
            let size = sizes[i] + sizes[j];
            merges.push(Merge {
                left: ids[i].min(ids[j]),
                right: ids[i].max(ids[j]),
                distance: min_dist,
                size,
            });

            // 3. Distances from the merged cluster, kept in slot i
            let (n_i, n_j) = (sizes[i] as f64, sizes[j] as f64);
            for &other in &active {
                if other == i || other == j {
                    continue;
                }
                let d = update(
                    method,
                    dist[other * n + i],
                    dist[other * n + j],
                    min_dist,
                    n_i,
                    n_j,
                    sizes[other] as f64,
                );
                dist[other * n + i] = d;
                dist[i * n + other] = d;
            }

            ids[i] = n + merges.len() - 1;
            sizes[i] = size;
            active.retain(|&slot| slot != j);
        }

        Ok(Dendrogram {
            n_leaves: n,
            merges,
        })
    }

    fn leaves_list(&self, dendrogram: &Dendrogram) -> Vec<usize> {
        let n = dendrogram.n_leaves;
        let mut leaves = Vec::with_capacity(n);
        let mut stack: Vec<NodeId> = dendrogram.root().into_iter().collect();

        while let Some(id) = stack.pop() {
            if id < n {
                leaves.push(id);
            } else {
                let merge = &dendrogram.merges[id - n];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }

        leaves
    }
}
