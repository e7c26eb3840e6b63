//! Deduplication of baked materials by original material identity.

use crate::error::Result;
use crate::types::{AssetPath, BlendMode};
use std::collections::btree_map::{self, BTreeMap};

/// Hex digits of the identity hash kept in baked names.
const NAME_HASH_LEN: usize = 32;

/// Deterministic name for the baked copy of `identity`: `<name>_<hash>`.
///
/// The hash covers the full identity string, so unrelated materials with the
/// same clean name never collide and reruns reproduce the same names.
pub fn baked_material_name(identity: &AssetPath) -> String {
    let hash = blake3::hash(identity.as_str().as_bytes()).to_hex();
    format!("{}_{}", identity.name(), &hash[..NAME_HASH_LEN])
}

/// The single baked material produced for one original material.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedMaterial {
    /// Original Material Identity.
    pub original: AssetPath,
    /// Deterministic baked name.
    pub name: String,
    /// Live baked material in the store.
    pub material: AssetPath,
    /// Blend mode of the original material.
    pub blend_mode: BlendMode,
    /// Meshes whose slots resolved to this material.
    pub users: Vec<AssetPath>,
}

impl BakedMaterial {
    pub fn add_user(&mut self, mesh: &AssetPath) {
        if !self.users.contains(mesh) {
            self.users.push(mesh.clone());
        }
    }
}

/// Original identity -> baked material, shared across all meshes of a batch.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: BTreeMap<AssetPath, BakedMaterial>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &AssetPath) -> Option<&BakedMaterial> {
        self.entries.get(identity)
    }

    /// Insert-or-get keyed by original identity.
    ///
    /// `create` runs only for unseen identities; it receives the baked name and
    /// returns the path of the material it created.
    pub fn resolve_with<F>(
        &mut self,
        identity: &AssetPath,
        blend_mode: BlendMode,
        create: F,
    ) -> Result<&mut BakedMaterial>
    where
        F: FnOnce(&str) -> Result<AssetPath>,
    {
        match self.entries.entry(identity.clone()) {
            btree_map::Entry::Occupied(entry) => Ok(entry.into_mut()),
            btree_map::Entry::Vacant(entry) => {
                let name = baked_material_name(identity);
                let material = create(&name)?;
                Ok(entry.insert(BakedMaterial {
                    original: identity.clone(),
                    name,
                    material,
                    blend_mode,
                    users: Vec::new(),
                }))
            }
        }
    }

    /// Entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &BakedMaterial> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
