//! HTTP client for the station-summary search service.
//!
//! Uses the curl crate (libcurl) for a blocking GET that returns a GeoJSON
//! feature collection, one feature per monitoring site, each carrying the
//! site's result count for the requested characteristics.

mod parse;

use std::time::Duration;
use url::Url;

use super::{RemoteSource, SourceError};
use crate::config::SourceConfig;
use crate::inventory::{InventoryQuery, InventoryRecord, QueryScope};

/// Parameters the client sets itself; ancillary parameters with these keys are ignored.
const RESERVED_PARAMS: &[&str] = &[
    "characteristicName",
    "statecode",
    "countycode",
    "mimeType",
    "zip",
];

/// Blocking client for the remote inventory service.
///
/// Only the connection phase is bounded; a stalled transfer blocks the
/// calling thread until the server closes the connection.
#[derive(Debug, Clone)]
pub struct WqpClient {
    base_url: String,
    connect_timeout: Duration,
}

impl WqpClient {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout,
        }
    }

    pub fn from_config(cfg: &SourceConfig) -> Self {
        Self::new(
            cfg.base_url.clone(),
            Duration::from_secs(cfg.connect_timeout_secs),
        )
    }

    /// Full request URL for `query`.
    pub fn request_url(&self, query: &InventoryQuery) -> Result<Url, SourceError> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(query.params.len() + 4);
        pairs.push((
            "characteristicName".to_string(),
            query.characteristics.join(";"),
        ));
        match &query.scope {
            QueryScope::Region(code) => pairs.push(("statecode".to_string(), code.clone())),
            QueryScope::SubRegions(codes) => {
                pairs.push(("countycode".to_string(), codes.join(";")))
            }
        }
        for (k, v) in &query.params {
            if RESERVED_PARAMS.contains(&k.as_str()) {
                tracing::debug!(param = %k, "ignoring reserved ancillary parameter");
                continue;
            }
            pairs.push((k.clone(), v.clone()));
        }
        pairs.push(("mimeType".to_string(), "geojson".to_string()));
        pairs.push(("zip".to_string(), "no".to_string()));
        Ok(Url::parse_with_params(&self.base_url, &pairs)?)
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.accept_encoding("")?;
        easy.connect_timeout(self.connect_timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(SourceError::Http(code));
        }
        Ok(body)
    }
}

impl RemoteSource for WqpClient {
    fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>, SourceError> {
        let url = self.request_url(query)?;
        tracing::debug!(scope = %query.scope.describe(), %url, "querying inventory");
        let body = self.fetch(&url)?;
        parse::parse_feature_collection(&body)
    }
}
