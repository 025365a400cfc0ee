use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GetIdRequest {
    pub collection_name: String,
    pub element: String,
    pub create_missing: bool,
}

#[derive(Debug, Serialize)]
pub struct GetIdResponse {
    pub id: i32,
}
