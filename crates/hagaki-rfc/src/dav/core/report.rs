//! REPORT request types (RFC 6352 §8, RFC 6578).

use super::property::PropertyName;

/// A parsed CardDAV REPORT request.
#[derive(Debug, Clone)]
pub enum ReportRequest {
    /// `addressbook-multiget` (RFC 6352 §8.7).
    Multiget(MultigetRequest),
    /// `sync-collection` (RFC 6578).
    SyncCollection(SyncCollectionRequest),
}

/// An `addressbook-multiget` REPORT.
#[derive(Debug, Clone, Default)]
pub struct MultigetRequest {
    /// Requested properties.
    pub properties: Vec<PropertyName>,
    /// Member hrefs to fetch.
    pub hrefs: Vec<String>,
}

/// A `sync-collection` REPORT.
#[derive(Debug, Clone, Default)]
pub struct SyncCollectionRequest {
    /// The client's last known sync token (empty string for initial sync).
    pub sync_token: String,
    /// Requested properties.
    pub properties: Vec<PropertyName>,
}
