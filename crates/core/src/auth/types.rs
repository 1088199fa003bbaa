use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Header the frontend gateway forwards the acting creator's id in,
/// lowercased as stored in [`AuthRequest::headers`].
pub const CREATOR_ID_HEADER: &str = "x-creator-id";

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

impl AuthRequest {
    /// Creator the caller is acting as, when the gateway forwarded one.
    pub fn creator_id(&self) -> Option<&str> {
        self.headers
            .get(CREATOR_ID_HEADER)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Authenticated identity
///
/// `creator_id` is present only when the request acts on behalf of a
/// creator; anonymous catalog reads carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub creator_id: Option<String>,
    pub method: String,
    pub claims: HashMap<String, serde_json::Value>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            creator_id: None,
            method: "none".to_string(),
            claims: HashMap::new(),
        }
    }
}
