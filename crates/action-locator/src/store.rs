//! Latest perception snapshot keyed by element id

use locus_core_types::ElementDescriptor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct StoreInner {
    descriptors: HashMap<String, Arc<ElementDescriptor>>,
    generation: u64,
}

/// Descriptor map that is only ever swapped as a whole.
///
/// A lookup never observes a mix of two snapshots.
#[derive(Default)]
pub struct DescriptorStore {
    inner: RwLock<StoreInner>,
}

impl DescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map with `snapshot`, returning the new generation.
    ///
    /// Duplicate ids inside one snapshot resolve to the last occurrence.
    pub fn replace(&self, snapshot: Vec<ElementDescriptor>) -> u64 {
        let mut descriptors = HashMap::with_capacity(snapshot.len());
        for descriptor in snapshot {
            let id = descriptor.element_id.clone();
            if descriptors.insert(id.clone(), Arc::new(descriptor)).is_some() {
                debug!(element_id = %id, "Duplicate element id in snapshot, keeping last");
            }
        }

        let mut inner = self.inner.write();
        inner.descriptors = descriptors;
        inner.generation += 1;
        debug!(
            generation = inner.generation,
            elements = inner.descriptors.len(),
            "Descriptor store replaced"
        );
        inner.generation
    }

    pub fn get(&self, element_id: &str) -> Option<Arc<ElementDescriptor>> {
        self.inner.read().descriptors.get(element_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().descriptors.is_empty()
    }

    /// Number of replacements so far
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }
}

impl std::fmt::Debug for DescriptorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("DescriptorStore")
            .field("elements", &inner.descriptors.len())
            .field("generation", &inner.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_whole_map() {
        let store = DescriptorStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);

        store.replace(vec![
            ElementDescriptor::new("1", "button"),
            ElementDescriptor::new("2", "a"),
        ]);
        assert_eq!(store.len(), 2);

        let generation = store.replace(vec![ElementDescriptor::new("3", "input")]);
        assert_eq!(generation, 2);
        assert!(store.get("1").is_none());
        assert_eq!(store.get("3").map(|d| d.tag_name.clone()), Some("input".into()));
    }

    #[test]
    fn duplicate_ids_keep_last() {
        let store = DescriptorStore::new();
        store.replace(vec![
            ElementDescriptor::new("1", "button").with_text("first"),
            ElementDescriptor::new("1", "button").with_text("second"),
        ]);
        assert_eq!(store.len(), 1);
        let descriptor = store.get("1").expect("descriptor");
        assert_eq!(descriptor.text.as_deref(), Some("second"));
    }
}
