use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator that accepts all requests, trusting any forwarded
/// creator header. Must be explicitly configured - the system won't
/// default to this.
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoneAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity {
            creator_id: request.creator_id().map(String::from),
            method: "none".to_string(),
            claims: std::collections::HashMap::new(),
        })
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
