use crate::libs::error::{GlobalignError, Result};
use crate::libs::uid::{Uid, ALIGNMENT_UIDS, LINK_UIDS};
use serde::{Deserialize, Serialize};

/// One aligned gene pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub uid: Uid,
    /// Gene uid in the query cluster
    pub query: Uid,
    /// Gene uid in the target cluster
    pub target: Uid,
    pub identity: f64,
    pub similarity: f64,
}

impl Link {
    pub fn new(query: Uid, target: Uid, identity: f64, similarity: f64) -> Self {
        Self {
            uid: LINK_UIDS.next(),
            query,
            target,
            identity: identity.clamp(0.0, 1.0),
            similarity: similarity.clamp(0.0, 1.0),
        }
    }

    pub fn has_gene(&self, gene: &str) -> bool {
        self.query == gene || self.target == gene
    }
}

/// All links between two clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub uid: Uid,
    /// Query cluster uid
    pub query: Uid,
    /// Target cluster uid
    pub target: Uid,
    pub links: Vec<Link>,
}

impl Alignment {
    pub fn new(query: impl Into<Uid>, target: impl Into<Uid>) -> Self {
        Self {
            uid: ALIGNMENT_UIDS.next(),
            query: query.into(),
            target: target.into(),
            links: Vec::new(),
        }
    }

    pub fn add_link(
        &mut self,
        query: impl Into<Uid>,
        target: impl Into<Uid>,
        identity: f64,
        similarity: f64,
    ) {
        self.links
            .push(Link::new(query.into(), target.into(), identity, similarity));
    }

    /// Whether the gene is an endpoint of any link
    pub fn contains(&self, gene: &str) -> bool {
        self.links.iter().any(|link| link.has_gene(gene))
    }

    /// Cumulative identity over all links.
    pub fn homology(&self) -> f64 {
        self.links.iter().map(|link| link.identity).sum()
    }

    /// Mean identity over all links.
    ///
    /// # Errors
    /// [`GlobalignError::EmptyAlignment`] when there are no links.
    pub fn score(&self) -> Result<f64> {
        if self.links.is_empty() {
            return Err(GlobalignError::EmptyAlignment(self.uid.clone()));
        }
        Ok(self.homology() / self.links.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }
}
