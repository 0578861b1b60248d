use std::collections::{BTreeMap, HashSet};
use std::fmt;

use bustrack_core::config::PublisherConfig;
use bustrack_core::PublisherId;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::RegistryError;

/// A registered bus. Immutable for the lifetime of the process.
#[derive(Clone)]
pub struct PublisherProfile {
    pub id: PublisherId,
    pub name: String,
    pub route: String,
    pub color: String,
    token_digest: [u8; 32],
}

impl PublisherProfile {
    pub fn new(id: &str, name: &str, route: &str, color: &str, token: &str) -> Self {
        Self {
            id: PublisherId::from(id),
            name: name.to_string(),
            route: route.to_string(),
            color: color.to_string(),
            token_digest: token_digest(token),
        }
    }

    /// SHA-256 of the secret. Fixed length, so comparisons never branch on
    /// how long the presented token is.
    pub(crate) fn token_digest(&self) -> &[u8; 32] {
        &self.token_digest
    }
}

impl fmt::Debug for PublisherProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("route", &self.route)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

pub(crate) fn token_digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Static table of known publishers, keyed and iterated by id.
#[derive(Debug, Clone)]
pub struct PublisherRegistry {
    profiles: BTreeMap<PublisherId, PublisherProfile>,
}

impl PublisherRegistry {
    /// Build from configuration, rejecting tables that would make
    /// authentication ambiguous.
    pub fn from_config(entries: &[PublisherConfig]) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut profiles = BTreeMap::new();
        let mut tokens = HashSet::new();
        for entry in entries {
            if entry.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if entry.token.is_empty() {
                return Err(RegistryError::EmptyToken {
                    id: entry.id.clone(),
                });
            }
            if !tokens.insert(entry.token.as_str()) {
                return Err(RegistryError::DuplicateToken {
                    id: entry.id.clone(),
                });
            }
            let profile = PublisherProfile::new(
                &entry.id,
                &entry.name,
                &entry.route,
                &entry.color,
                &entry.token,
            );
            if profiles.insert(profile.id.clone(), profile).is_some() {
                return Err(RegistryError::DuplicateId {
                    id: entry.id.clone(),
                });
            }
        }

        info!(publishers = profiles.len(), "publisher registry loaded");
        Ok(Self { profiles })
    }

    pub fn get(&self, id: &str) -> Option<&PublisherProfile> {
        self.profiles.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublisherProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bustrack_core::config::default_publishers;

    #[test]
    fn default_fleet_loads_in_id_order() {
        let registry = PublisherRegistry::from_config(&default_publishers()).unwrap();
        let ids: Vec<&str> = registry.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["BUS-01", "BUS-02", "BUS-03", "BUS-04", "BUS-05"]);
        assert_eq!(registry.get("BUS-01").unwrap().name, "Bus 1");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut entries = default_publishers();
        entries[1].id = "BUS-01".to_string();
        assert!(matches!(
            PublisherRegistry::from_config(&entries),
            Err(RegistryError::DuplicateId { .. })
        ));
    }

    #[test]
    fn shared_token_is_rejected() {
        let mut entries = default_publishers();
        entries[2].token = entries[0].token.clone();
        assert!(matches!(
            PublisherRegistry::from_config(&entries),
            Err(RegistryError::DuplicateToken { ref id }) if id == "BUS-03"
        ));
    }

    #[test]
    fn empty_table_and_empty_token_are_rejected() {
        assert!(matches!(
            PublisherRegistry::from_config(&[]),
            Err(RegistryError::Empty)
        ));

        let mut entries = default_publishers();
        entries[0].token.clear();
        assert!(matches!(
            PublisherRegistry::from_config(&entries),
            Err(RegistryError::EmptyToken { .. })
        ));
    }

    #[test]
    fn debug_never_prints_secret_material() {
        let registry = PublisherRegistry::from_config(&default_publishers()).unwrap();
        let rendered = format!("{:?}", registry);
        assert!(!rendered.contains("TOKEN-BUS01-SECRET"));
        assert!(!rendered.contains("token_digest"));
    }
}
