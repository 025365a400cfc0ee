use serde::{Deserialize, Serialize};

/// `POST /get_id` request body (spec §6.4).
#[derive(Debug, Serialize)]
pub struct GetIdRequest<'a> {
    pub collection_name: &'a str,
    pub element: &'a str,
    pub create_missing: bool,
}

#[derive(Debug, Deserialize)]
pub struct GetIdResponse {
    pub id: i32,
}

pub const ORIGIN_COLLECTION: &str = "origin";
pub const BRAND_COLLECTION: &str = "brand";
pub const CATEGORY_COLLECTION: &str = "category";
