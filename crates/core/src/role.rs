//! Metadata roles and their signing requirements.

use crate::key_id::KeyId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A role taken from root metadata: who may sign it and how many must.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    pub name: String,
    /// Minimum number of valid signatures (always at least 1).
    pub threshold: u32,
    pub authorized_key_ids: BTreeSet<KeyId>,
}

impl RoleDescriptor {
    /// File name of the role's signed document.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// True if `key_id` may sign for this role.
    pub fn is_authorized(&self, key_id: &KeyId) -> bool {
        self.authorized_key_ids.contains(key_id)
    }
}
