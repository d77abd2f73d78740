//! Request context carrying the acting user and correlation id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vaultshare_core::types::id::{RequestId, UserId};

/// Context for the current caller request.
///
/// Built by the caller and passed into every service method so that each
/// operation knows *who* is acting. Log lines carry `request_id` for
/// correlation instead of relying on ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// Correlation id for this request.
    pub request_id: RequestId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context with a fresh request id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            request_id: RequestId::new(),
            request_time: Utc::now(),
        }
    }

    /// Replaces the request id with one supplied by the caller.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}
