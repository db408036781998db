use std::collections::HashSet;

/// Existence oracle for recovery group-policy addresses. The registry of
/// group authorities lives outside this module; the engine only ever asks
/// whether a policy address is real.
pub trait GroupRegistry: Send + Sync {
    fn policy_exists(&self, address: &str) -> bool;
}

/// In-memory registry for wiring and tests.
#[derive(Debug, Default)]
pub struct InMemoryGroupRegistry {
    policies: HashSet<String>,
}

impl InMemoryGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policies<I: IntoIterator<Item = String>>(policies: I) -> Self {
        Self {
            policies: policies.into_iter().collect(),
        }
    }

    pub fn register(&mut self, address: impl Into<String>) {
        self.policies.insert(address.into());
    }
}

impl GroupRegistry for InMemoryGroupRegistry {
    fn policy_exists(&self, address: &str) -> bool {
        self.policies.contains(address)
    }
}
