//! Homology groups and gene-order contiguity.
//!
//! The synteny score of two clusters follows the antiSMASH/MultiGeneBlast
//! form `S = h + i * s`, where `h` is the cumulative identity of the links,
//! `s` the number of contiguous gene pairs shared by both clusters and `i`
//! a weight. Contiguity is measured on homology groups: genes linked by an
//! alignment share a group, and two neighbouring genes yield the ordered
//! pair of their groups.

use crate::libs::alignment::Link;
use crate::libs::cluster::Cluster;
use crate::libs::uid::Uid;
use fxhash::FxHashMap;
use indexmap::IndexSet;
use std::hash::Hash;

/// Identity a link needs to join two genes into one homology group.
pub const GROUP_THRESHOLD: f64 = 0.3;

/// Ordered pair of group indices of two neighbouring genes
pub type GroupPair = (usize, usize);

/// Gene to group assignment produced for one comparison.
///
/// Only meaningful for the alignment it was built from; every synteny
/// comparison builds its own.
#[derive(Debug, Default, Clone)]
pub struct HomologyGroups {
    groups: Vec<IndexSet<Uid>>,
    index: FxHashMap<Uid, usize>,
}

impl HomologyGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group index of a gene, if any link touched it
    pub fn group_of(&self, gene: &str) -> Option<usize> {
        self.index.get(gene).copied()
    }

    /// Member lists in creation order. A gene can appear in more than one list.
    pub fn groups(&self) -> &[IndexSet<Uid>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group genes by single linkage over `links`.
///
/// Links below `threshold` are ignored. For each link the existing groups
/// are scanned in order and the first one holding either endpoint takes the
/// other endpoint, which is then labelled with that group even if it already
/// sat in a later one. The later group is not merged. Links touching no
/// group start a new one.
pub fn assign_groups<'a, I>(links: I, threshold: f64) -> HomologyGroups
where
    I: IntoIterator<Item = &'a Link>,
{
    let mut hg = HomologyGroups::new();

    for link in links {
        if link.identity < threshold {
            continue;
        }

        let found = hg
            .groups
            .iter()
            .position(|group| group.contains(&link.query) || group.contains(&link.target));

        match found {
            Some(i) => {
                for gene in [&link.query, &link.target] {
                    if hg.groups[i].insert(gene.clone()) {
                        hg.index.insert(gene.clone(), i);
                    }
                }
            }
            None => {
                let i = hg.groups.len();
                let mut group = IndexSet::new();
                group.insert(link.query.clone());
                group.insert(link.target.clone());
                hg.groups.push(group);
                hg.index.insert(link.query.clone(), i);
                hg.index.insert(link.target.clone(), i);
            }
        }
    }

    hg
}

/// Contiguous group pairs of a cluster, locus by locus in gene order.
///
/// Neighbours where either gene has no group are skipped rather than
/// emitted with an empty slot, so two ungrouped neighbours never count as
/// a shared pair.
pub fn get_pairs(cluster: &Cluster, groups: &HomologyGroups) -> Vec<GroupPair> {
    let mut pairs = Vec::new();
    for locus in &cluster.loci {
        for window in locus.genes.windows(2) {
            if let (Some(a), Some(b)) = (groups.group_of(&window[0].uid), groups.group_of(&window[1].uid)) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Number of pairs shared by two pair lists.
///
/// Each distinct pair present in both contributes the smaller of its two
/// counts. Pairs are ordered: `(1, 2)` does not match `(2, 1)`.
///
/// ```
/// use gcalign::libs::synteny::compare_pairs;
/// assert_eq!(compare_pairs(&[(1, 2)], &[(2, 1)]), 0);
/// assert_eq!(compare_pairs(&[(1, 2)], &[(1, 2), (1, 2)]), 1);
/// ```
pub fn compare_pairs<T: Eq + Hash>(one: &[T], two: &[T]) -> usize {
    let counts_two = count_pairs(two);
    count_pairs(one)
        .into_iter()
        .filter_map(|(pair, n)| counts_two.get(pair).map(|&m| n.min(m)))
        .sum()
}

fn count_pairs<T: Eq + Hash>(pairs: &[T]) -> FxHashMap<&T, usize> {
    let mut counts: FxHashMap<&T, usize> = FxHashMap::default();
    for pair in pairs {
        *counts.entry(pair).or_insert(0) += 1;
    }
    counts
}
