use async_trait::async_trait;
use reqwest::Client;

use crate::cache::IdCache;
use crate::error::InternerError;
use crate::wire::{GetIdRequest, GetIdResponse};

/// The ID-Interner seam of spec §6.4: resolves a string dimension
/// (origin, brand, category) to its dense integer id, creating the
/// mapping on first use when `create_missing` is set.
#[async_trait]
pub trait InternerClient: Send + Sync {
    async fn get_id(&self, collection: &str, element: &str, create_missing: bool) -> Result<i32, InternerError>;
}

/// Resolves to a `u16`, the width every aggregate key dimension packs
/// into (spec §4.5 counter packing). Fails if the interner has
/// allocated more than 65 536 distinct elements for the collection.
pub async fn get_u16_id(
    client: &dyn InternerClient,
    collection: &str,
    element: &str,
    create_missing: bool,
) -> Result<u16, InternerError> {
    let id = client.get_id(collection, element, create_missing).await?;
    u16::try_from(id).map_err(|_| InternerError::OutOfRange(id))
}

/// An HTTP client with an in-process cache layered in front of it
/// (spec §9, "client-side caching of dimension ids"). A cache hit
/// never touches the network; a miss populates the cache from the
/// server's response so repeated tags for the same brand/category/
/// origin only pay the network round trip once per process.
pub struct HttpInternerClient {
    http: Client,
    base_url: String,
    cache: IdCache,
}

impl HttpInternerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            cache: IdCache::new(),
        }
    }

    async fn fetch(&self, collection: &str, element: &str, create_missing: bool) -> Result<i32, InternerError> {
        let request = GetIdRequest {
            collection_name: collection,
            element,
            create_missing,
        };
        let response = self
            .http
            .post(format!("{}/get_id", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| InternerError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(InternerError::Status(response.status().as_u16()));
        }

        let body: GetIdResponse = response
            .json()
            .await
            .map_err(|err| InternerError::Decode(err.to_string()))?;
        Ok(body.id)
    }
}

#[async_trait]
impl InternerClient for HttpInternerClient {
    async fn get_id(&self, collection: &str, element: &str, create_missing: bool) -> Result<i32, InternerError> {
        if let Some(id) = self.cache.get(collection, element).await {
            return Ok(id);
        }
        let id = self.fetch(collection, element, create_missing).await?;
        self.cache.insert(collection, element, id).await;
        Ok(id)
    }
}

/// The `id_getter_null_client` seam of spec §6.5: always resolves to
/// id `0` without caching or making a request.
#[derive(Default, Clone, Copy)]
pub struct NullInternerClient;

#[async_trait]
impl InternerClient for NullInternerClient {
    async fn get_id(&self, collection: &str, element: &str, _create_missing: bool) -> Result<i32, InternerError> {
        tracing::debug!(collection, element, "null interner client invoked");
        Ok(0)
    }
}
