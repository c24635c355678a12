use crate::libs::uid::{Uid, CLUSTER_UIDS, GENE_UIDS, LOCUS_UIDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A protein-coding gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub uid: Uid,
    pub name: String,
    /// Every label the gene is known by, `name` included
    #[serde(default)]
    pub names: BTreeSet<String>,
    /// Translated amino-acid sequence
    pub translation: String,
}

impl Gene {
    pub fn new(name: impl Into<String>, translation: impl Into<String>) -> Self {
        let name = name.into();
        let mut names = BTreeSet::new();
        names.insert(name.clone());
        Self {
            uid: GENE_UIDS.next(),
            name,
            names,
            translation: translation.into(),
        }
    }

    /// Replace the generated uid (builder pattern)
    pub fn with_uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = uid.into();
        GENE_UIDS.observe(&self.uid);
        self
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}

/// An ordered run of genes on one contiguous segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    pub uid: Uid,
    pub name: String,
    pub genes: Vec<Gene>,
}

impl Locus {
    pub fn new(name: impl Into<String>, genes: Vec<Gene>) -> Self {
        Self {
            uid: LOCUS_UIDS.next(),
            name: name.into(),
            genes,
        }
    }

    pub fn with_uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = uid.into();
        LOCUS_UIDS.observe(&self.uid);
        self
    }
}

/// A gene cluster made of one or more loci.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub uid: Uid,
    pub name: String,
    pub loci: Vec<Locus>,
}

impl Cluster {
    pub fn new(name: impl Into<String>, loci: Vec<Locus>) -> Self {
        Self {
            uid: CLUSTER_UIDS.next(),
            name: name.into(),
            loci,
        }
    }

    pub fn with_uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = uid.into();
        CLUSTER_UIDS.observe(&self.uid);
        self
    }

    /// All genes, locus by locus, in gene order
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.loci.iter().flat_map(|locus| locus.genes.iter())
    }

    pub fn gene_count(&self) -> usize {
        self.loci.iter().map(|locus| locus.genes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_genes_in_order() {
        let cluster = Cluster::new(
            "c1",
            vec![
                Locus::new("l1", vec![Gene::new("a", "MA"), Gene::new("b", "MB")]),
                Locus::new("l2", vec![Gene::new("c", "MC")]),
            ],
        );
        let names: Vec<_> = cluster.genes().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(cluster.gene_count(), 3);
    }

    #[test]
    fn test_generated_uids_are_distinct() {
        let g1 = Gene::new("a", "M");
        let g2 = Gene::new("a", "M");
        assert_ne!(g1.uid, g2.uid);
        assert!(g1.names.contains("a"));
    }

    #[test]
    fn test_with_uid() {
        let gene = Gene::new("a", "M").with_uid("gene-a");
        assert_eq!(gene.uid, "gene-a");
        let cluster = Cluster::new("c", vec![]).with_uid("c-1");
        assert_eq!(cluster.uid, "c-1");
    }
}
