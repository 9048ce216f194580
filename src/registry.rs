// Remote registry client and cache-or-fetch lookup

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::cache::CacheStore;

/// Client for the upstream statistics committee API.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        RegistryClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the registry record for a BIN and extract its payload.
    ///
    /// A transport failure, an error status, a non-JSON body, or a body
    /// without the `obj` payload all fail the lookup. No retry.
    pub async fn fetch(&self, bin: &str) -> Result<Value> {
        let url = format!(
            "{}/api/juridical/counter/api/?bin={}&lang=ru",
            self.base_url, bin
        );

        let body: Value = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("registry request failed for bin {}", bin))?
            .error_for_status()
            .with_context(|| format!("registry returned an error status for bin {}", bin))?
            .json()
            .await
            .with_context(|| format!("registry response for bin {} is not JSON", bin))?;

        body.get("obj")
            .cloned()
            .ok_or_else(|| anyhow!("registry response for bin {} has no obj payload", bin))
    }
}

/// Cache-or-fetch lookup for one BIN.
///
/// A cache hit returns the stored payload without contacting the registry;
/// a miss fetches, persists the payload as the new cache entry, then
/// returns it.
pub async fn lookup(cache: &CacheStore, client: &RegistryClient, bin: &str) -> Result<Value> {
    if let Some(cached) = cache.get(bin)? {
        println!("Reading from cache file");
        return Ok(cached);
    }

    println!("Making an API request");
    let payload = client.fetch(bin).await?;
    cache.put(bin, &payload)?;

    Ok(payload)
}
