use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::descriptor::EndpointDescriptor;
use crate::operation::OperationKey;

/// Descriptor cache keyed by operation identity.
///
/// Entries are never evicted. Concurrent first use of one key runs the build
/// closure once; other callers wait on the shard lock and receive the same
/// `Arc`. Failed builds leave no entry behind.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<OperationKey, Arc<EndpointDescriptor>>,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &OperationKey) -> Option<Arc<EndpointDescriptor>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the cached descriptor for `key`, building it on first use.
    ///
    /// # Errors
    /// Whatever `build` returns; nothing is cached in that case.
    pub fn get_or_try_insert_with<E, F>(
        &self,
        key: &OperationKey,
        build: F,
    ) -> Result<Arc<EndpointDescriptor>, E>
    where
        F: FnOnce() -> Result<EndpointDescriptor, E>,
    {
        if let Some(found) = self.get(key) {
            trace!(operation = %key, "descriptor cache hit");
            return Ok(found);
        }

        let entry = self
            .entries
            .entry(key.clone())
            .or_try_insert_with(|| {
                let descriptor = build()?;
                debug!(operation = %key, "caching endpoint descriptor");
                Ok(Arc::new(descriptor))
            })?;
        Ok(Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<OperationKey> {
        let mut keys: Vec<OperationKey> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
