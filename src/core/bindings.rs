//! Caller-supplied name bindings
//!
//! Bindings map short names to [`Value`]s and are resolved once, at compile
//! time, when cell expressions are parsed. An identifier that is neither the
//! bound variable of a condition column nor a binding is a compile error.

use crate::core::value::Value;
use fxhash::FxHashMap;

/// Name → value substitutions applied while compiling cells
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    map: FxHashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.map.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut b = Bindings::new();
        for (name, value) in iter {
            b.insert(name, value);
        }
        b
    }
}
