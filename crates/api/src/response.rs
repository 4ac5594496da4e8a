//! Response envelope types for API handlers.
//!
//! Every successful payload is wrapped as `{ "data": ... }`; the admin client
//! renders its pages from these.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A mutated entity together with the many-to-many changes applied to it.
#[derive(Debug, Serialize)]
pub struct SyncedResponse<T: Serialize> {
    #[serde(flatten)]
    pub entity: T,
    pub sync: pressdesk_core::sync::SyncResult,
}
