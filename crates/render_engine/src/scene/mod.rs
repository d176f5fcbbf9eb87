//! Scene registry and opaque scene handles
//!
//! Scene loading and material definitions live outside the engine. The
//! registry only maps opaque keys to descriptors the capability knows how to
//! compile, so the iteration driver can compare handles and resolve the
//! active one without understanding scene content.

use slotmap::SlotMap;
use std::path::PathBuf;

slotmap::new_key_type! {
    /// Opaque handle to a registered scene
    pub struct SceneKey;
}

/// Description of a scene the capability can compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDescriptor {
    /// Scene name, forwarded in render requests and log lines
    pub name: String,

    /// Optional asset location for capabilities that load geometry from disk
    pub asset_path: Option<PathBuf>,
}

impl SceneDescriptor {
    /// Create a descriptor with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_path: None,
        }
    }

    /// Attach an asset path
    #[must_use]
    pub fn with_asset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_path = Some(path.into());
        self
    }
}

/// Registry of scenes available to the render loop
#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: SlotMap<SceneKey, SceneDescriptor>,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene and return its opaque key
    pub fn insert(&mut self, descriptor: SceneDescriptor) -> SceneKey {
        self.scenes.insert(descriptor)
    }

    /// Look up a scene by key
    pub fn get(&self, key: SceneKey) -> Option<&SceneDescriptor> {
        self.scenes.get(key)
    }

    /// Remove a scene; the key becomes invalid
    pub fn remove(&mut self, key: SceneKey) -> Option<SceneDescriptor> {
        self.scenes.remove(key)
    }

    /// Number of registered scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Iterate over registered scenes
    pub fn iter(&self) -> impl Iterator<Item = (SceneKey, &SceneDescriptor)> {
        self.scenes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = SceneRegistry::new();
        let key = registry.insert(SceneDescriptor::named("cornell"));
        assert_eq!(registry.get(key).map(|s| s.name.as_str()), Some("cornell"));
    }

    #[test]
    fn test_removed_key_is_invalid() {
        let mut registry = SceneRegistry::new();
        let key = registry.insert(SceneDescriptor::named("cornell"));
        registry.remove(key);
        assert!(registry.get(key).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_distinct_scenes_get_distinct_keys() {
        let mut registry = SceneRegistry::new();
        let a = registry.insert(SceneDescriptor::named("cornell"));
        let b = registry.insert(SceneDescriptor::named("cornell"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
