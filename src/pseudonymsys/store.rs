use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rand_core::{CryptoRngCore, OsRng, RngCore};
use tracing::debug;

use super::{PubKey, SecKey, SessionKey};
use crate::{Error, Group, Result};

/// One-time registration keys handed to users out of band.
pub trait RegistrationStore: Send + Sync {
    /// Returns `true` and forgets `key` if it was valid. Two concurrent calls
    /// with the same key never both return `true`.
    fn check_and_consume(&self, key: &str) -> Result<bool>;
}

/// Source of session keys for successful credential transfers.
pub trait SessionKeyGenerator: Send + Sync {
    fn generate(&self) -> Result<SessionKey>;
}

/// Organization key material by organization name.
pub trait OrgKeyStore<E>: Send + Sync {
    fn secret_key(&self, organization: &str) -> Result<SecKey>;
    fn public_key(&self, organization: &str) -> Result<PubKey<E>>;
}

#[derive(Debug, Default)]
pub struct MemoryRegistrationStore {
    keys: Mutex<HashSet<String>>,
}

impl MemoryRegistrationStore {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: Mutex::new(keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn insert(&self, key: impl Into<String>) -> Result<()> {
        self.keys
            .lock()
            .map_err(|e| Error::Collaborator(e.to_string().into()))?
            .insert(key.into());
        Ok(())
    }

    /// Number of keys not yet consumed.
    pub fn len(&self) -> Result<usize> {
        let keys = self
            .keys
            .lock()
            .map_err(|e| Error::Collaborator(e.to_string().into()))?;
        Ok(keys.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl RegistrationStore for MemoryRegistrationStore {
    fn check_and_consume(&self, key: &str) -> Result<bool> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|e| Error::Collaborator(e.to_string().into()))?;
        let consumed = keys.remove(key);
        debug!(consumed, remaining = keys.len(), "registration key checked");
        Ok(consumed)
    }
}

/// Draws session keys of a fixed length from the operating system.
#[derive(Clone, Copy, Debug)]
pub struct RandomSessionKeys {
    len: usize,
}

impl RandomSessionKeys {
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::InvalidParams(
                "session keys must not be empty".to_string(),
            ));
        }
        Ok(Self { len })
    }
}

impl SessionKeyGenerator for RandomSessionKeys {
    fn generate(&self) -> Result<SessionKey> {
        let mut bytes = vec![0u8; self.len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::Collaborator(Box::new(e)))?;
        Ok(SessionKey::new(bytes))
    }
}

/// In-memory organization keys, all over one group.
#[derive(Debug)]
pub struct MemoryOrgKeyStore<G: Group> {
    group: G,
    keys: HashMap<String, SecKey>,
}

impl<G: Group> MemoryOrgKeyStore<G> {
    pub fn new(group: G) -> Self {
        Self {
            group,
            keys: HashMap::new(),
        }
    }

    /// Generates fresh keys for every name in `organizations`.
    pub fn generate<I, S, R>(group: G, organizations: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: CryptoRngCore,
    {
        let mut store = Self::new(group);
        for organization in organizations {
            let key = SecKey::generate(&store.group, rng);
            store.keys.insert(organization.into(), key);
        }
        store
    }

    pub fn insert(&mut self, organization: impl Into<String>, key: SecKey) {
        self.keys.insert(organization.into(), key);
    }

    fn lookup(&self, organization: &str) -> Result<&SecKey> {
        self.keys.get(organization).ok_or_else(|| {
            Error::Collaborator(format!("no keys for organization '{organization}'").into())
        })
    }
}

impl<G: Group> OrgKeyStore<G::Element> for MemoryOrgKeyStore<G> {
    fn secret_key(&self, organization: &str) -> Result<SecKey> {
        self.lookup(organization).cloned()
    }

    fn public_key(&self, organization: &str) -> Result<PubKey<G::Element>> {
        Ok(self.lookup(organization)?.public_key(&self.group))
    }
}
