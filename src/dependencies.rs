//! Named dependency bundle handed to async options factories.
//!
//! The composition root provides values under string names; a module built with
//! `register_async` declares which names it imports and its factory only sees
//! those.

use crate::error::BoxError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Dependencies {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Dependencies").field("names", &names).finish()
    }
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide `value` under `name`, replacing any previous value
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed lookup; `None` if missing or of a different type
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.values
            .get(name)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Typed lookup for use inside factories, where a missing value is an error
    pub fn require<T>(&self, name: &str) -> Result<Arc<T>, BoxError>
    where
        T: Any + Send + Sync,
    {
        self.get::<T>(name).ok_or_else(|| {
            format!(
                "dependency '{name}' is missing or is not a {}",
                std::any::type_name::<T>()
            )
            .into()
        })
    }

    /// Bundle restricted to `names`; names that are not present are skipped
    pub fn subset(&self, names: &[String]) -> Self {
        let values = names
            .iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|value| (name.clone(), Arc::clone(value)))
            })
            .collect();
        Self { values }
    }
}
