//! Flat, uid-keyed form of a [`Globaligner`].
//!
//! Schema (JSON):
//!
//! ```text
//! {
//!   "order":      [cluster uid, ...],
//!   "clusters":   { uid: { uid, name, loci: [locus uid, ...] } },
//!   "loci":       { uid: { uid, name, genes: [gene uid, ...] } },
//!   "genes":      { uid: { uid, name, names, translation } },
//!   "alignments": { uid: { uid, query, target, links: [link uid, ...] } },
//!   "links":      { uid: { uid, query, target, identity, similarity } }
//! }
//! ```
//!
//! Parents hold child uids only; each payload is written once. Restoring
//! resolves every uid back to the single object it names.

use crate::libs::alignment::{Alignment, Link};
use crate::libs::cluster::{Cluster, Gene, Locus};
use crate::libs::error::{GlobalignError, Result};
use crate::libs::globaligner::Globaligner;
use crate::libs::uid::{Uid, ALIGNMENT_UIDS, CLUSTER_UIDS, GENE_UIDS, LINK_UIDS, LOCUS_UIDS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub uid: Uid,
    pub name: String,
    pub loci: Vec<Uid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocusRecord {
    pub uid: Uid,
    pub name: String,
    pub genes: Vec<Uid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub uid: Uid,
    pub query: Uid,
    pub target: Uid,
    pub links: Vec<Uid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub order: Vec<Uid>,
    pub clusters: IndexMap<Uid, ClusterRecord>,
    pub loci: IndexMap<Uid, LocusRecord>,
    pub genes: IndexMap<Uid, Gene>,
    pub alignments: IndexMap<Uid, AlignmentRecord>,
    pub links: IndexMap<Uid, Link>,
}

fn missing(kind: &str, uid: &str, owner_kind: &str, owner: &str) -> GlobalignError {
    GlobalignError::Lookup(format!(
        "{} {} referenced by {} {} is missing or already used",
        kind, uid, owner_kind, owner
    ))
}

impl Session {
    /// Flatten a store.
    pub fn from_globaligner(ga: &Globaligner) -> Self {
        let mut session = Session::default();

        for cluster in ga.clusters() {
            session.order.push(cluster.uid.clone());
            session.clusters.insert(
                cluster.uid.clone(),
                ClusterRecord {
                    uid: cluster.uid.clone(),
                    name: cluster.name.clone(),
                    loci: cluster.loci.iter().map(|l| l.uid.clone()).collect(),
                },
            );
            for locus in &cluster.loci {
                session.loci.insert(
                    locus.uid.clone(),
                    LocusRecord {
                        uid: locus.uid.clone(),
                        name: locus.name.clone(),
                        genes: locus.genes.iter().map(|g| g.uid.clone()).collect(),
                    },
                );
                for gene in &locus.genes {
                    session.genes.insert(gene.uid.clone(), gene.clone());
                }
            }
        }

        for alignment in ga.alignments() {
            session.alignments.insert(
                alignment.uid.clone(),
                AlignmentRecord {
                    uid: alignment.uid.clone(),
                    query: alignment.query.clone(),
                    target: alignment.target.clone(),
                    links: alignment.links.iter().map(|l| l.uid.clone()).collect(),
                },
            );
            for link in &alignment.links {
                session.links.insert(link.uid.clone(), link.clone());
            }
        }

        session
    }

    /// Rebuild a store: genes, then loci, then clusters, then alignments,
    /// then links.
    ///
    /// # Errors
    /// [`GlobalignError::Lookup`] on a dangling or reused uid,
    /// [`GlobalignError::InvalidInput`] on a numeric uid of `usize::MAX`.
    pub fn into_globaligner(self) -> Result<Globaligner> {
        let Session {
            order,
            mut clusters,
            mut loci,
            mut genes,
            alignments,
            mut links,
        } = self;

        for uid in genes.keys() {
            GENE_UIDS.try_observe(uid)?;
        }

        let mut restored = Vec::with_capacity(order.len());
        for cluster_uid in &order {
            let record = clusters
                .swap_remove(cluster_uid)
                .ok_or_else(|| missing("cluster", cluster_uid, "order", "list"))?;
            CLUSTER_UIDS.try_observe(&record.uid)?;

            let mut cluster_loci = Vec::with_capacity(record.loci.len());
            for locus_uid in &record.loci {
                let locus = loci
                    .swap_remove(locus_uid)
                    .ok_or_else(|| missing("locus", locus_uid, "cluster", &record.uid))?;
                LOCUS_UIDS.try_observe(&locus.uid)?;

                let mut locus_genes = Vec::with_capacity(locus.genes.len());
                for gene_uid in &locus.genes {
                    let gene = genes
                        .swap_remove(gene_uid)
                        .ok_or_else(|| missing("gene", gene_uid, "locus", &locus.uid))?;
                    locus_genes.push(gene);
                }
                cluster_loci.push(Locus {
                    uid: locus.uid,
                    name: locus.name,
                    genes: locus_genes,
                });
            }
            restored.push(Cluster {
                uid: record.uid,
                name: record.name,
                loci: cluster_loci,
            });
        }

        let mut ga = Globaligner::new();
        ga.add_clusters(restored)?;

        let mut shells = Vec::with_capacity(alignments.len());
        for (_, record) in alignments {
            for uid in [&record.query, &record.target] {
                if ga.cluster(uid).is_none() {
                    return Err(missing("cluster", uid, "alignment", &record.uid));
                }
            }
            ALIGNMENT_UIDS.try_observe(&record.uid)?;
            let alignment = Alignment {
                uid: record.uid,
                query: record.query,
                target: record.target,
                links: Vec::with_capacity(record.links.len()),
            };
            shells.push((alignment, record.links));
        }

        for (mut alignment, link_uids) in shells {
            for link_uid in &link_uids {
                let link = links
                    .swap_remove(link_uid)
                    .ok_or_else(|| missing("link", link_uid, "alignment", &alignment.uid))?;
                LINK_UIDS.try_observe(&link.uid)?;
                alignment.links.push(link);
            }
            ga.add_alignment(alignment)?;
        }

        Ok(ga)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Globaligner {
    pub fn to_session(&self) -> Session {
        Session::from_globaligner(self)
    }

    pub fn from_session(session: Session) -> Result<Self> {
        session.into_globaligner()
    }

    pub fn to_json(&self) -> Result<String> {
        self.to_session().to_json()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_session(Session::from_json(json)?)
    }

    /// Write the session as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &self.to_session())?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let session: Session = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::from_session(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> Globaligner {
        let c1 = Cluster::new(
            "alpha",
            vec![
                Locus::new(
                    "alpha_1",
                    vec![Gene::new("alpA", "MSTKLVAAGHW"), Gene::new("alpB", "MKKLLPTAA")],
                ),
                Locus::new("alpha_2", vec![Gene::new("alpC", "MDENQW")]),
            ],
        );
        let c2 = Cluster::new(
            "beta",
            vec![Locus::new(
                "beta_1",
                vec![Gene::new("betA", "MSTKLVAAGHW"), Gene::new("betB", "MKKLLPTAV")],
            )],
        );
        let c3 = Cluster::new("gamma", vec![Locus::new("gamma_1", vec![Gene::new("gamA", "MDENQW")])]);

        let mut ga = Globaligner::new();
        ga.add_clusters([c1, c2, c3]).unwrap();
        ga.align_stored_clusters(0.3).unwrap();
        ga
    }

    #[test]
    fn test_schema_keys() {
        let ga = store();
        let value: serde_json::Value = serde_json::from_str(&ga.to_json().unwrap()).unwrap();
        for key in ["order", "clusters", "loci", "genes", "alignments", "links"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["order"].as_array().unwrap().len(), 3);
        assert_eq!(value["genes"].as_object().unwrap().len(), 6);

        // children are stored as bare uids
        let first = ga.cluster_uids().next().unwrap();
        assert!(value["clusters"][first]["loci"][0].is_string());
    }

    #[test]
    fn test_round_trip() {
        let ga = store();
        let restored = Globaligner::from_json(&ga.to_json().unwrap()).unwrap();

        let before: Vec<_> = ga.clusters().collect();
        let after: Vec<_> = restored.clusters().collect();
        assert_eq!(before, after);
        assert_eq!(ga.alignments(), restored.alignments());
        assert_eq!(ga.to_session(), restored.to_session());

        for alignment in ga.alignments() {
            let other = restored
                .get_alignment(&alignment.target, &alignment.query)
                .unwrap();
            assert_eq!(alignment, other);
        }
    }

    #[test]
    fn test_round_trip_shares_genes() {
        let ga = store();
        let restored = Globaligner::from_json(&ga.to_json().unwrap()).unwrap();

        let alignment = restored.alignments().iter().find(|a| !a.is_empty()).unwrap();
        let link = &alignment.links[0];
        let via_link = restored.gene(&link.query).unwrap();

        let via_locus = restored
            .cluster(&alignment.query)
            .unwrap()
            .genes()
            .find(|g| g.uid == link.query)
            .unwrap();
        assert!(std::ptr::eq(via_link, via_locus));
    }

    #[test]
    fn test_restored_uids_do_not_collide() {
        let ga = store();
        let mut session = ga.to_session();
        // pretend the file came from a long-running process
        let gene = session.genes.swap_remove_index(0).unwrap().1;
        let big = "900000".to_string();
        let locus = session
            .loci
            .values_mut()
            .find(|l| l.genes.contains(&gene.uid))
            .unwrap();
        for uid in locus.genes.iter_mut() {
            if *uid == gene.uid {
                *uid = big.clone();
            }
        }
        for link in session.links.values_mut() {
            if link.query == gene.uid {
                link.query = big.clone();
            }
            if link.target == gene.uid {
                link.target = big.clone();
            }
        }
        session.genes.insert(big.clone(), Gene { uid: big.clone(), ..gene });

        let restored = session.into_globaligner().unwrap();
        assert!(restored.gene("900000").is_some());
        let fresh = Gene::new("new", "M");
        assert!(fresh.uid.parse::<usize>().unwrap() > 900000);
    }

    #[test]
    fn test_uid_without_successor() {
        let ga = store();
        let mut session = ga.to_session();
        let big = usize::MAX.to_string();
        session
            .genes
            .insert(big.clone(), Gene::new("stray", "M").with_uid(big.as_str()));

        let json = session.to_json().unwrap();
        let err = Globaligner::from_json(&json).unwrap_err();
        assert!(matches!(err, GlobalignError::InvalidInput(ref m) if m.contains(&big)));
        assert!(Gene::new("after", "M").uid.parse::<usize>().unwrap() < usize::MAX);
    }

    #[test]
    fn test_dangling_reference() {
        let ga = store();
        let mut session = ga.to_session();
        let (uid, _) = session.genes.swap_remove_index(0).unwrap();
        let err = session.into_globaligner().unwrap_err();
        assert!(matches!(err, GlobalignError::Lookup(ref m) if m.contains(&uid)));

        let mut session = ga.to_session();
        session.order.push("nowhere".to_string());
        assert!(session.into_globaligner().is_err());
    }

    #[test]
    fn test_save_load() {
        let ga = store();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        ga.save(&path).unwrap();

        let loaded = Globaligner::load(&path).unwrap();
        assert_eq!(ga.to_session(), loaded.to_session());

        assert!(Globaligner::load(temp.path().join("absent.json")).is_err());
        std::fs::write(&path, "{\"order\": 3}").unwrap();
        assert!(matches!(Globaligner::load(&path), Err(GlobalignError::Json(_))));
    }
}
