//! Remote inventory source.
//!
//! The collector talks to the remote service only through [`RemoteSource`],
//! so tests can inject sources that fail on broad scopes. [`WqpClient`] is
//! the HTTP implementation against the station-summary endpoint.

mod error;
mod wqp;

pub use error::SourceError;
pub use wqp::WqpClient;

use crate::inventory::{InventoryQuery, InventoryRecord};

/// A remote service that returns per-site result counts for a query.
///
/// Implementations may fail for overly broad scopes; the collector decides
/// whether to split and retry.
pub trait RemoteSource {
    fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>, SourceError>;
}

impl<S: RemoteSource + ?Sized> RemoteSource for &S {
    fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>, SourceError> {
        (**self).query(query)
    }
}
