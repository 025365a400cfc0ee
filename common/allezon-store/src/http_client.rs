use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::record::Generation;
use crate::store::RecordStore;
use crate::wire::{
    AddRequest, ErrorBody, GetOrderedMapRequest, GetOrderedMapResponse, ListAppendUniqueRequest, ListAppendUniqueResponse,
    ListGetRequest, ListGetResponse, MapPutRequest, MapPutResponse, MapRemoveRangeRequest, MapSizeRequest, MapSizeResponse,
    ScanAllRequest, ScanAllResponse,
};

/// The networked `RecordStore` of spec §6.3: every primitive becomes
/// one POST to a `store-service` process, which is the single process
/// actually holding the `InMemoryStore`. `api-service`,
/// `worker-service`, and `id-interner-service` all point an instance
/// of this client at the same `store-service` address, which is what
/// makes the worker's aggregate writes visible to the API's aggregate
/// reads (spec §2, "one namespace holds everything") — the three
/// processes no longer hold disjoint in-memory copies.
///
/// Shaped after `allezon-interner-client::HttpInternerClient`: a bare
/// `reqwest::Client` and a base URL, no client-side cache (the store's
/// values change far too often for one to help, unlike the ID-Interner
/// dimension lookups).
pub struct HttpRecordStore {
    http: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: Client::new(), base_url: base_url.into() }
    }

    async fn post<Req: Serialize + Sync, Resp: DeserializeOwned>(&self, path: &str, request: &Req) -> Result<Resp, StoreError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(request)
            .send()
            .await
            .map_err(|err| StoreError::Request(err.to_string()))?;
        Self::unwrap_response(response).await
    }

    async fn post_empty<Req: Serialize + Sync>(&self, path: &str, request: &Req) -> Result<(), StoreError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(request)
            .send()
            .await
            .map_err(|err| StoreError::Request(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::decode_error(response).await)
        }
    }

    async fn unwrap_response<Resp: DeserializeOwned>(response: reqwest::Response) -> Result<Resp, StoreError> {
        if response.status().is_success() {
            response.json::<Resp>().await.map_err(|err| StoreError::Decode(err.to_string()))
        } else {
            Err(Self::decode_error(response).await)
        }
    }

    async fn decode_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => StoreError::from_wire(&body.kind, body.message),
            Err(_) => StoreError::Backend(format!("store-service returned HTTP {status}")),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get_ordered_map(&self, set: &str, key: &str, bin: &str) -> Result<Vec<(i64, Vec<u8>)>, StoreError> {
        let request = GetOrderedMapRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string() };
        let response: GetOrderedMapResponse = self.post("/get_ordered_map", &request).await?;
        Ok(response.entries)
    }

    async fn map_put(&self, set: &str, key: &str, bin: &str, map_key: i64, value: Vec<u8>) -> Result<usize, StoreError> {
        let request = MapPutRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string(), map_key, value };
        let response: MapPutResponse = self.post("/map_put", &request).await?;
        Ok(response.new_size)
    }

    async fn map_size(&self, set: &str, key: &str, bin: &str) -> Result<(usize, Generation), StoreError> {
        let request = MapSizeRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string() };
        let response: MapSizeResponse = self.post("/map_size", &request).await?;
        Ok((response.size, response.generation))
    }

    async fn map_remove_range(
        &self,
        set: &str,
        key: &str,
        bin: &str,
        count: usize,
        expected_generation: Generation,
    ) -> Result<(), StoreError> {
        let request = MapRemoveRangeRequest {
            set: set.to_string(),
            key: key.to_string(),
            bin: bin.to_string(),
            count,
            expected_generation,
        };
        self.post_empty("/map_remove_range", &request).await
    }

    async fn list_get(&self, set: &str, key: &str, bin: &str) -> Result<Vec<String>, StoreError> {
        let request = ListGetRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string() };
        let response: ListGetResponse = self.post("/list_get", &request).await?;
        Ok(response.elements)
    }

    async fn list_append_unique(&self, set: &str, key: &str, bin: &str, value: &str) -> Result<usize, StoreError> {
        let request = ListAppendUniqueRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string(), value: value.to_string() };
        let response: ListAppendUniqueResponse = self.post("/list_append_unique", &request).await?;
        Ok(response.new_len)
    }

    async fn add(&self, set: &str, key: &str, bin: &str, delta: u64) -> Result<(), StoreError> {
        let request = AddRequest { set: set.to_string(), key: key.to_string(), bin: bin.to_string(), delta };
        self.post_empty("/add", &request).await
    }

    async fn scan_all(&self, set: &str, bin: &str) -> Result<Vec<(String, u64)>, StoreError> {
        let request = ScanAllRequest { set: set.to_string(), bin: bin.to_string() };
        let response: ScanAllResponse = self.post("/scan_all", &request).await?;
        Ok(response.rows)
    }
}
