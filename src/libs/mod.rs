pub mod aligner;
pub mod alignment;
pub mod cluster;
pub mod error;
pub mod format;
pub mod globaligner;
pub mod identity;
pub mod io;
pub mod linkage;
pub mod session;
pub mod synteny;
pub mod uid;

pub use aligner::PairwiseAligner;
pub use alignment::{Alignment, Link};
pub use cluster::{Cluster, Gene, Locus};
pub use error::GlobalignError;
pub use globaligner::Globaligner;
pub use linkage::{Clusterer, LanceWilliams, Method};
pub use session::Session;
