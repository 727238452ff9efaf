//! Response envelopes used by the backend's domain endpoints.

use serde::Deserialize;

/// Single-resource envelope: `{statusCode, message, data}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

/// Collection envelope with pagination metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope<T> {
    pub status_code: u16,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
}
