//! Environment for variable bindings

use super::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope of variable bindings, chained outward to its parent.
///
/// Scopes are created for the program root, every function call and every
/// `for` loop. A child holds its parent alive through the `Rc`, so the chain
/// can only be extended outward and never forms a cycle.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create a root environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind in this scope, replacing any existing binding here
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable in the scope chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Update the nearest binding of `name`. Returns false if no scope binds it.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            true
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().set(name, value)
        } else {
            false
        }
    }

    /// Update the nearest binding, or create one here when the name is unbound
    pub fn assign(&mut self, name: &str, value: Value) {
        if !self.set(name, value.clone()) {
            self.define(name, value);
        }
    }

    /// Check if a variable exists in the scope chain
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.borrow().contains(name))
    }

    /// Bindings of this scope only
    pub fn bindings(&self) -> &HashMap<String, Value> {
        &self.bindings
    }

    /// Number of scopes from here to the root, inclusive
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.borrow().depth())
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}
