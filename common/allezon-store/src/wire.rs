use serde::{Deserialize, Serialize};

use crate::record::Generation;

/// The HTTP wire protocol a networked `RecordStore` speaks: one
/// request/response pair per trait primitive, plus a structured error
/// body so a client can reconstruct the exact `StoreError` variant a
/// server-side call failed with (mirroring
/// `allezon-interner-client::wire`'s request/response split).
#[derive(Debug, Serialize, Deserialize)]
pub struct GetOrderedMapRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetOrderedMapResponse {
    pub entries: Vec<(i64, Vec<u8>)>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapPutRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
    pub map_key: i64,
    pub value: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapPutResponse {
    pub new_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapSizeRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapSizeResponse {
    pub size: usize,
    pub generation: Generation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapRemoveRangeRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
    pub count: usize,
    pub expected_generation: Generation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListGetRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListGetResponse {
    pub elements: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListAppendUniqueRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListAppendUniqueResponse {
    pub new_len: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddRequest {
    pub set: String,
    pub key: String,
    pub bin: String,
    pub delta: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanAllRequest {
    pub set: String,
    pub bin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanAllResponse {
    pub rows: Vec<(String, u64)>,
}

/// Non-2xx response body. `kind` round-trips a `StoreError` variant
/// across the wire; `message` is for logs only.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}
