use std::sync::Arc;

use crate::error::AuthError;
use crate::registry::{token_digest, PublisherProfile, PublisherRegistry};

/// Validates presented secrets against the registry. Stateless.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    registry: Arc<PublisherRegistry>,
}

impl TokenAuthenticator {
    pub fn new(registry: Arc<PublisherRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve which publisher owns `token`.
    ///
    /// Every profile is compared, match or not, so the time taken does not
    /// depend on where (or whether) the token appears in the table.
    pub fn authenticate(&self, token: &str) -> Result<&PublisherProfile, AuthError> {
        let presented = token_digest(token);
        let mut found = None;
        for profile in self.registry.iter() {
            if constant_time_eq(profile.token_digest(), &presented) && found.is_none() {
                found = Some(profile);
            }
        }
        found.ok_or(AuthError::InvalidToken)
    }

    /// Check that `token` belongs to the claimed publisher.
    pub fn verify(&self, publisher_id: &str, token: &str) -> Result<&PublisherProfile, AuthError> {
        let profile = self
            .registry
            .get(publisher_id)
            .ok_or_else(|| AuthError::UnknownPublisher {
                id: publisher_id.to_string(),
            })?;
        if constant_time_eq(profile.token_digest(), &token_digest(token)) {
            Ok(profile)
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    pub fn registry(&self) -> &Arc<PublisherRegistry> {
        &self.registry
    }
}

/// Constant-time comparison for auth validation.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use bustrack_core::config::default_publishers;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(Arc::new(
            PublisherRegistry::from_config(&default_publishers()).unwrap(),
        ))
    }

    #[test]
    fn token_resolves_to_its_bus() {
        let auth = authenticator();
        let profile = auth.authenticate("TOKEN-BUS01-SECRET").unwrap();
        assert_eq!(profile.id.as_str(), "BUS-01");
        assert_eq!(profile.route, "BRUR → Modern More → Station");

        let profile = auth.authenticate("TOKEN-BUS05-SECRET").unwrap();
        assert_eq!(profile.id.as_str(), "BUS-05");
    }

    #[test]
    fn unknown_token_and_prefix_are_invalid() {
        let auth = authenticator();
        assert_eq!(auth.authenticate("nope").unwrap_err(), AuthError::InvalidToken);
        assert_eq!(
            auth.authenticate("TOKEN-BUS01-SECRE").unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(auth.authenticate("").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn verify_checks_token_against_claimed_bus() {
        let auth = authenticator();
        assert!(auth.verify("BUS-02", "TOKEN-BUS02-SECRET").is_ok());
        // a valid token for a different bus is still refused
        assert_eq!(
            auth.verify("BUS-02", "TOKEN-BUS01-SECRET").unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            auth.verify("BUS-99", "TOKEN-BUS01-SECRET").unwrap_err(),
            AuthError::UnknownPublisher { id: "BUS-99".into() }
        );
    }

    #[test]
    fn digest_comparison_sees_the_last_byte() {
        let stored = token_digest("TOKEN-BUS03-SECRET");
        assert!(constant_time_eq(&stored, &token_digest("TOKEN-BUS03-SECRET")));

        let mut tampered = stored;
        tampered[31] ^= 0x01;
        assert!(!constant_time_eq(&stored, &tampered));
        // truncated digest never matches
        assert!(!constant_time_eq(&stored, &stored[..31]));
    }
}
