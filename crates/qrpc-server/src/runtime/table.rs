use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use super::address::{address_from_annotations, compose};
use super::binding::MethodBinding;
use crate::service::{ClassMeta, MethodAccess};

/// A registered address: its bindings and the method it invokes.
#[derive(Debug)]
pub struct BindingEntry<S> {
    pub binding: MethodBinding,
    pub method: Arc<MethodAccess<S>>,
}

/// Ordered set of the table keys, used for longest-prefix lookups.
#[derive(Debug, Clone, Default)]
pub struct AddressIndex(BTreeSet<String>);

impl AddressIndex {
    pub fn contains(&self, address: &str) -> bool {
        self.0.contains(address)
    }

    /// Greatest key strictly below `address`.
    pub fn lower(&self, address: &str) -> Option<&str> {
        self.0
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(address)))
            .next_back()
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map from address keys to method bindings.
///
/// Built once when a service is initialized and read-only afterwards.
/// A key claimed by another method keeps its first position but takes the
/// new binding; a method registering a key it already holds is a no-op.
#[derive(Debug)]
pub struct BindingTable<S> {
    entries: Vec<Arc<BindingEntry<S>>>,
    positions: HashMap<String, usize>,
    index: AddressIndex,
}

impl<S> Default for BindingTable<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            index: AddressIndex::default(),
        }
    }
}

impl<S> BindingTable<S> {
    /// Registers every public method of `meta` under `base`.
    ///
    /// Each method is reachable at its annotated address (if any), its name,
    /// and its name in lower and upper case.
    pub fn build(meta: &ClassMeta<S>, base: &str) -> Self {
        let mut table = Self::default();

        for method in meta.methods().iter().filter(|m| m.is_public()) {
            if let Some(address) = address_from_annotations(method.annotations()) {
                table.register(method, &address, base);
            }
            table.register(method, method.name(), base);
            table.register(method, &method.name().to_lowercase(), base);
            table.register(method, &method.name().to_uppercase(), base);
        }

        table.index = AddressIndex(table.positions.keys().cloned().collect());
        table
    }

    fn register(&mut self, method: &Arc<MethodAccess<S>>, path: &str, base: &str) {
        let binding = MethodBinding::for_method(method, compose(base, path));
        let entry = Arc::new(BindingEntry {
            binding,
            method: Arc::clone(method),
        });
        let key = entry.binding.key().to_string();

        match self.positions.get(&key) {
            // A method's own aliases never replace its annotated route
            Some(&position) if Arc::ptr_eq(&self.entries[position].method, method) => {}
            Some(&position) => {
                tracing::debug!("Rebinding {} to method {}", key, method.name());
                self.entries[position] = entry;
            }
            None => {
                tracing::debug!("Binding {} to method {}", key, method.name());
                self.positions.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<BindingEntry<S>>> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    /// Entries in first-registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<BindingEntry<S>>> {
        self.entries.iter()
    }

    pub fn index(&self) -> &AddressIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
