//! # Admin Registry
//!
//! A fixed allowlist of administrator user ids, loaded once at startup.
//!
//! Admin status is configuration, not data: there is no "grant admin"
//! operation at runtime, and the registry never touches the database.
//! The usual deployment reads a comma-separated id list from the
//! `ADMIN_IDS` environment variable.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Environment variable holding the comma-separated admin id list.
pub const ADMIN_IDS_ENV: &str = "ADMIN_IDS";

/// Immutable set of administrator user ids.
#[derive(Debug, Clone, Default)]
pub struct AdminRegistry {
    ids: HashSet<i64>,
}

impl AdminRegistry {
    /// Builds a registry from explicit ids.
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        AdminRegistry {
            ids: ids.into_iter().collect(),
        }
    }

    /// Builds a registry from the `ADMIN_IDS` environment variable
    /// (`"123,456"`). Unparseable entries are skipped with a warning; a
    /// missing variable yields an empty registry, which locks every
    /// admin operation.
    pub fn from_env() -> Self {
        let raw = std::env::var(ADMIN_IDS_ENV).unwrap_or_default();
        let mut ids = HashSet::new();

        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<i64>() {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => warn!(entry = part, "Ignoring unparseable admin id"),
            }
        }

        if ids.is_empty() {
            warn!("Admin registry is empty; all admin operations will be rejected");
        }

        AdminRegistry { ids }
    }

    /// Whether the user is an administrator.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Fails with [`EngineError::Forbidden`] unless the user is an admin.
    pub fn require(&self, user_id: i64) -> EngineResult<()> {
        if self.is_admin(user_id) {
            Ok(())
        } else {
            Err(EngineError::Forbidden { user_id })
        }
    }

    /// All admin ids (notification fan-out targets).
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let registry = AdminRegistry::from_ids([10, 20]);

        assert!(registry.require(10).is_ok());
        assert!(matches!(
            registry.require(30),
            Err(EngineError::Forbidden { user_id: 30 })
        ));
    }

    #[test]
    fn test_empty_registry_rejects_everyone() {
        let registry = AdminRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.require(1).is_err());
    }
}
