//! Binding registration types.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::InjectResult;
use crate::injector::Injector;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::settings::Settings;
use crate::traits::AnyArc;

pub(crate) type Ctor = Arc<dyn Fn(&Settings, &Injector) -> InjectResult<AnyArc> + Send + Sync>;

/// What a binding resolves to
#[derive(Clone)]
pub(crate) enum Target {
    Instance(AnyArc),
    Provider {
        lifetime: Lifetime,
        ctor: Ctor,
        /// Singleton cache, shared by every clone of the binding
        cell: Arc<Mutex<Option<AnyArc>>>,
    },
}

/// A binding with the type of the value it produces
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) target: Target,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

impl Binding {
    pub(crate) fn instance(value: AnyArc, type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            target: Target::Instance(value),
            type_id,
            type_name,
        }
    }

    pub(crate) fn provider(lifetime: Lifetime, ctor: Ctor, type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            target: Target::Provider {
                lifetime,
                ctor,
                cell: Arc::new(Mutex::new(None)),
            },
            type_id,
            type_name,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match &self.target {
            Target::Instance(_) => "instance",
            Target::Provider { lifetime: Lifetime::Transient, .. } => "transient provider",
            Target::Provider { lifetime: Lifetime::Singleton, .. } => "singleton provider",
            Target::Provider { lifetime: Lifetime::Scoped, .. } => "scoped provider",
        }
    }
}

/// Bindings held by a single container
#[derive(Clone, Default)]
pub(crate) struct Registry {
    bindings: HashMap<Key, Binding>,
}

impl Registry {
    /// Inserts a binding, replacing any previous one for the key
    pub(crate) fn insert(&mut self, key: Key, binding: Binding) -> Option<Binding> {
        self.bindings.insert(key, binding)
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Binding> {
        self.bindings.remove(key)
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.bindings.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Binding)> {
        self.bindings.iter()
    }
}
