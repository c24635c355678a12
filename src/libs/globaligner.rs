//! The alignment store.
//!
//! [`Globaligner`] owns every registered [`Cluster`] (and through them every
//! locus and gene) plus the [`Alignment`]s computed between them. Entities
//! refer to each other by uid only; the store resolves uids in O(1) through
//! its lookup indices, so a gene reached from its locus and from a link is
//! one and the same object.

use crate::libs::aligner::PairwiseAligner;
use crate::libs::alignment::Alignment;
use crate::libs::cluster::{Cluster, Gene, Locus};
use crate::libs::error::{GlobalignError, Result};
use crate::libs::identity::compute_identity;
use crate::libs::linkage::{Clusterer, LanceWilliams, Method};
use crate::libs::synteny::{assign_groups, compare_pairs, get_pairs, GROUP_THRESHOLD};
use crate::libs::uid::Uid;
use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;
use itertools::{iproduct, Itertools};
use log::{debug, info};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocusPos {
    cluster: usize,
    locus: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GenePos {
    cluster: usize,
    locus: usize,
    gene: usize,
}

// Gene pair that passed the cutoff, before it becomes a Link
#[derive(Debug, Clone)]
struct GeneHit {
    query: Uid,
    target: Uid,
    identity: f64,
    similarity: f64,
}

/// Unordered cluster pair as a canonical key
fn pair_key(one: &str, two: &str) -> (Uid, Uid) {
    if one <= two {
        (one.to_string(), two.to_string())
    } else {
        (two.to_string(), one.to_string())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Globaligner {
    pub aligner: PairwiseAligner,
    clusters: IndexMap<Uid, Cluster>,
    alignments: Vec<Alignment>,
    loci: FxHashMap<Uid, LocusPos>,
    genes: FxHashMap<Uid, GenePos>,
    pairs: FxHashMap<(Uid, Uid), usize>,
}

impl Globaligner {
    /// Empty store with the default aligner
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aligner(aligner: PairwiseAligner) -> Self {
        Self {
            aligner,
            ..Self::default()
        }
    }

    pub fn aligner_settings(&self) -> String {
        self.aligner.settings()
    }

    // --- Lookup ---

    pub fn cluster(&self, uid: &str) -> Option<&Cluster> {
        self.clusters.get(uid)
    }

    /// Clusters in registration order
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn cluster_uids(&self) -> impl Iterator<Item = &Uid> {
        self.clusters.keys()
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn locus(&self, uid: &str) -> Option<&Locus> {
        let pos = self.loci.get(uid)?;
        let (_, cluster) = self.clusters.get_index(pos.cluster)?;
        cluster.loci.get(pos.locus)
    }

    pub fn gene(&self, uid: &str) -> Option<&Gene> {
        let pos = self.genes.get(uid)?;
        let (_, cluster) = self.clusters.get_index(pos.cluster)?;
        cluster.loci.get(pos.locus)?.genes.get(pos.gene)
    }

    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Union of the names of every stored gene.
    pub fn gene_labels(&self) -> BTreeSet<String> {
        self.clusters
            .values()
            .flat_map(|cluster| cluster.genes())
            .flat_map(|gene| gene.names.iter().cloned())
            .collect()
    }

    /// Stored alignment between two clusters, in either direction.
    ///
    /// # Errors
    /// [`GlobalignError::Lookup`] when no alignment is stored for the pair.
    pub fn get_alignment(&self, one: &str, two: &str) -> Result<&Alignment> {
        self.pairs
            .get(&pair_key(one, two))
            .map(|&index| &self.alignments[index])
            .ok_or_else(|| {
                GlobalignError::Lookup(format!("no alignment stored for {} vs {}", one, two))
            })
    }

    pub fn has_alignment(&self, one: &str, two: &str) -> bool {
        self.pairs.contains_key(&pair_key(one, two))
    }

    // --- Registration ---

    /// Register clusters and index their loci and genes.
    ///
    /// A cluster whose uid is already stored replaces the old one in place,
    /// and every alignment involving it is dropped so the pair is aligned
    /// again by [`Globaligner::align_stored_clusters`].
    ///
    /// # Errors
    /// [`GlobalignError::InvalidInput`] if a cluster, locus or gene has an
    /// empty uid, or a locus/gene uid is already indexed under another
    /// cluster. Clusters before the offending one stay registered.
    pub fn add_clusters<I>(&mut self, clusters: I) -> Result<()>
    where
        I: IntoIterator<Item = Cluster>,
    {
        for cluster in clusters {
            self.validate_cluster(&cluster)?;

            if let Some(pos) = self.clusters.get_index_of(&cluster.uid) {
                self.loci.retain(|_, p| p.cluster != pos);
                self.genes.retain(|_, p| p.cluster != pos);
                self.drop_alignments_of(&cluster.uid);
            }

            let (pos, _) = self.clusters.insert_full(cluster.uid.clone(), cluster);
            let cluster = &self.clusters[pos];
            for (li, locus) in cluster.loci.iter().enumerate() {
                self.loci.insert(
                    locus.uid.clone(),
                    LocusPos {
                        cluster: pos,
                        locus: li,
                    },
                );
                for (gi, gene) in locus.genes.iter().enumerate() {
                    self.genes.insert(
                        gene.uid.clone(),
                        GenePos {
                            cluster: pos,
                            locus: li,
                            gene: gi,
                        },
                    );
                }
            }
        }

        Ok(())
    }

    // Alignments of a replaced cluster link genes that are gone
    fn drop_alignments_of(&mut self, uid: &str) {
        let before = self.alignments.len();
        self.alignments
            .retain(|alignment| alignment.query != uid && alignment.target != uid);
        if self.alignments.len() == before {
            return;
        }
        debug!(
            "Cluster {} replaced, {} alignments dropped",
            uid,
            before - self.alignments.len()
        );

        self.pairs = self
            .alignments
            .iter()
            .enumerate()
            .map(|(index, alignment)| (pair_key(&alignment.query, &alignment.target), index))
            .collect();
    }

    fn validate_cluster(&self, cluster: &Cluster) -> Result<()> {
        if cluster.uid.is_empty() {
            return Err(GlobalignError::InvalidInput(format!(
                "cluster \"{}\" has an empty uid",
                cluster.name
            )));
        }
        let own = self.clusters.get_index_of(&cluster.uid);

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for locus in &cluster.loci {
            if locus.uid.is_empty() {
                return Err(GlobalignError::InvalidInput(format!(
                    "locus \"{}\" of cluster {} has an empty uid",
                    locus.name, cluster.uid
                )));
            }
            if !seen.insert(&locus.uid) {
                return Err(GlobalignError::InvalidInput(format!(
                    "locus uid {} appears twice in cluster {}",
                    locus.uid, cluster.uid
                )));
            }
            if let Some(p) = self.loci.get(&locus.uid) {
                if Some(p.cluster) != own {
                    return Err(GlobalignError::InvalidInput(format!(
                        "locus uid {} of cluster {} is already registered with another cluster",
                        locus.uid, cluster.uid
                    )));
                }
            }
        }

        seen.clear();
        for gene in cluster.genes() {
            if gene.uid.is_empty() {
                return Err(GlobalignError::InvalidInput(format!(
                    "gene \"{}\" of cluster {} has an empty uid",
                    gene.name, cluster.uid
                )));
            }
            if !seen.insert(&gene.uid) {
                return Err(GlobalignError::InvalidInput(format!(
                    "gene uid {} appears twice in cluster {}",
                    gene.uid, cluster.uid
                )));
            }
            if let Some(p) = self.genes.get(&gene.uid) {
                if Some(p.cluster) != own {
                    return Err(GlobalignError::InvalidInput(format!(
                        "gene uid {} of cluster {} is already registered with another cluster",
                        gene.uid, cluster.uid
                    )));
                }
            }
        }

        Ok(())
    }

    /// Store an alignment and return its position.
    ///
    /// An alignment already stored for the same (unordered) cluster pair is
    /// overwritten where it stands.
    ///
    /// # Errors
    /// [`GlobalignError::Lookup`] if either cluster or any linked gene is not
    /// registered. Alignments carry uids only, so register both clusters
    /// with [`Globaligner::add_clusters`] first.
    pub fn add_alignment(&mut self, alignment: Alignment) -> Result<usize> {
        for uid in [&alignment.query, &alignment.target] {
            if !self.clusters.contains_key(uid) {
                return Err(GlobalignError::Lookup(format!(
                    "alignment {} refers to cluster {} which is not stored",
                    alignment.uid, uid
                )));
            }
        }
        for link in &alignment.links {
            for uid in [&link.query, &link.target] {
                if !self.genes.contains_key(uid) {
                    return Err(GlobalignError::Lookup(format!(
                        "link {} refers to gene {} which is not stored",
                        link.uid, uid
                    )));
                }
            }
        }

        let key = pair_key(&alignment.query, &alignment.target);
        let index = match self.pairs.get(&key) {
            Some(&index) => {
                self.alignments[index] = alignment;
                index
            }
            None => {
                let index = self.alignments.len();
                self.alignments.push(alignment);
                self.pairs.insert(key, index);
                index
            }
        };

        Ok(index)
    }

    // --- Alignment ---

    fn gene_hits(&self, one: &Cluster, two: &Cluster, cutoff: f64) -> Vec<GeneHit> {
        iproduct!(&one.loci, &two.loci)
            .flat_map(|(locus_a, locus_b)| iproduct!(&locus_a.genes, &locus_b.genes))
            .filter_map(|(gene_a, gene_b)| {
                let aln = self.aligner.align(&gene_a.translation, &gene_b.translation);
                let (identity, similarity) = compute_identity(&aln.one, &aln.two);
                if identity < cutoff {
                    return None;
                }
                Some(GeneHit {
                    query: gene_a.uid.clone(),
                    target: gene_b.uid.clone(),
                    identity,
                    similarity,
                })
            })
            .collect()
    }

    fn build_alignment(one: &str, two: &str, hits: Vec<GeneHit>) -> Alignment {
        let mut alignment = Alignment::new(one, two);
        for hit in hits {
            alignment.add_link(hit.query, hit.target, hit.identity, hit.similarity);
        }
        alignment
    }

    /// Align every gene of `one` against every gene of `two`.
    ///
    /// Gene pairs with identity below `cutoff` are dropped. The alignment is
    /// returned, not stored.
    pub fn align_clusters(&self, one: &Cluster, two: &Cluster, cutoff: f64) -> Alignment {
        let hits = self.gene_hits(one, two, cutoff);
        Self::build_alignment(&one.uid, &two.uid, hits)
    }

    /// Align and store every stored cluster pair that has no alignment yet.
    ///
    /// Pairs are aligned on the current rayon pool; alignments are created
    /// and stored from the calling thread in pair order. Returns the number
    /// of new alignments.
    pub fn align_stored_clusters(&mut self, cutoff: f64) -> Result<usize> {
        let clusters: Vec<&Cluster> = self.clusters.values().collect();
        let todo: Vec<(usize, usize)> = (0..clusters.len())
            .tuple_combinations()
            .filter(|&(i, j)| !self.has_alignment(&clusters[i].uid, &clusters[j].uid))
            .collect();

        let results: Vec<Vec<GeneHit>> = todo
            .par_iter()
            .map(|&(i, j)| {
                info!("{} vs {}", clusters[i].name, clusters[j].name);
                self.gene_hits(clusters[i], clusters[j], cutoff)
            })
            .collect();

        let pairs: Vec<(Uid, Uid)> = todo
            .iter()
            .map(|&(i, j)| (clusters[i].uid.clone(), clusters[j].uid.clone()))
            .collect();

        let count = pairs.len();
        for ((one, two), hits) in pairs.into_iter().zip(results) {
            let alignment = Self::build_alignment(&one, &two, hits);
            debug!(
                "Alignment {} ({} vs {}): {} links",
                alignment.uid,
                one,
                two,
                alignment.len()
            );
            self.add_alignment(alignment)?;
        }

        Ok(count)
    }

    // --- Scoring ---

    /// Synteny score `homology + weight * contiguity` of two stored clusters.
    ///
    /// # Errors
    /// [`GlobalignError::Lookup`] without a stored alignment for the pair.
    pub fn synteny(&self, one: &str, two: &str, weight: f64) -> Result<f64> {
        let alignment = self.get_alignment(one, two)?;
        let homology = alignment.homology();

        let groups = assign_groups(&alignment.links, GROUP_THRESHOLD);
        let cluster = |uid: &str| {
            self.cluster(uid)
                .ok_or_else(|| GlobalignError::Lookup(format!("cluster {} is not stored", uid)))
        };
        let one_pairs = get_pairs(cluster(one)?, &groups);
        let two_pairs = get_pairs(cluster(two)?, &groups);
        let contiguity = compare_pairs(&one_pairs, &two_pairs);

        debug!(
            "{} vs {}: homology {:.4}, {} groups, contiguity {}",
            one,
            two,
            homology,
            groups.len(),
            contiguity
        );

        Ok(homology + weight * contiguity as f64)
    }

    /// All-against-all synteny matrix in cluster registration order.
    ///
    /// The diagonal is zero. With `normalise` every value is divided by the
    /// maximum; with `as_distance` every value becomes `max - value`.
    pub fn matrix(&self, weight: f64, normalise: bool, as_distance: bool) -> Result<DMatrix<f64>> {
        let uids: Vec<&Uid> = self.clusters.keys().collect();
        let n = uids.len();

        let cells: Vec<(usize, usize)> = iproduct!(0..n, 0..n).filter(|(i, j)| i != j).collect();
        let scores = cells
            .par_iter()
            .map(|&(i, j)| self.synteny(uids[i], uids[j], weight))
            .collect::<Result<Vec<f64>>>()?;

        let mut matrix = DMatrix::<f64>::zeros(n, n);
        for (&(i, j), score) in cells.iter().zip(scores) {
            matrix[(i, j)] = score;
        }

        if normalise {
            let max = matrix.iter().cloned().fold(0.0, f64::max);
            if max > 0.0 {
                matrix /= max;
            }
        }
        if as_distance {
            let maximum = if normalise {
                1.0
            } else {
                matrix.iter().cloned().fold(0.0, f64::max)
            };
            matrix = matrix.map(|v| maximum - v);
            matrix.fill_diagonal(0.0);
        }

        Ok(matrix)
    }

    /// Display order of the stored clusters (indices into registration order).
    pub fn order(&self, weight: f64, method: Method) -> Result<Vec<usize>> {
        self.order_with(weight, method, &LanceWilliams)
    }

    /// [`Globaligner::order`] with a caller-supplied clustering routine.
    ///
    /// The leaf order of the dendrogram is reversed before it is returned.
    pub fn order_with<C>(&self, weight: f64, method: Method, clusterer: &C) -> Result<Vec<usize>>
    where
        C: Clusterer + ?Sized,
    {
        match self.clusters.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![0]),
            _ => {}
        }

        let matrix = self.matrix(weight, true, true)?;
        let dendrogram = clusterer.linkage(&condense(&matrix), method)?;
        let mut order = clusterer.leaves_list(&dendrogram);
        order.reverse();

        Ok(order)
    }
}

/// Upper triangle of a square matrix, row by row.
pub fn condense(matrix: &DMatrix<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            condensed.push(matrix[(i, j)]);
        }
    }
    condensed
}

/// Build a store from `clusters` and align them.
///
/// With a single cluster there is nothing to align and the store is
/// returned as is.
pub fn align(clusters: Vec<Cluster>, cutoff: f64, aligner: PairwiseAligner) -> Result<Globaligner> {
    let single = clusters.len() == 1;
    let mut ga = Globaligner::with_aligner(aligner);
    ga.add_clusters(clusters)?;
    if single {
        info!("Only one cluster given, skipping alignment");
    } else {
        ga.align_stored_clusters(cutoff)?;
    }
    Ok(ga)
}
