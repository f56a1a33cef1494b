//! Named references between tasks
//!
//! A [`Link`] only carries the name of its target. Targets may be produced
//! later in the same pass, by another builder, or never; dangling links are
//! caught by [`TaskGraph::resolve`](crate::TaskGraph::resolve), not when the
//! link is created.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Serialize, Serializer};

use crate::task::TaskKind;

/// Key identifying a task in the graph: its kind plus its name
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey {
    /// Task kind (e.g. `SecurityGroup`)
    pub kind: &'static str,
    /// Task name
    pub name: String,
}

impl TaskKey {
    /// Create a key for a task of kind `T`
    pub fn of<T: TaskKind>(name: impl Into<String>) -> Self {
        Self {
            kind: T::KIND,
            name: name.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A lazily resolved reference to a task of kind `T`
pub struct Link<T> {
    name: String,
    _kind: PhantomData<fn() -> T>,
}

impl<T: TaskKind> Link<T> {
    /// Link to the task of kind `T` named `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _kind: PhantomData,
        }
    }

    /// Name of the target task
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Graph key of the target task
    pub fn key(&self) -> TaskKey {
        TaskKey::of::<T>(self.name.clone())
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Link<T> {}

impl<T> Hash for Link<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T: TaskKind> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({}/{})", T::KIND, self.name)
    }
}

impl<T> Serialize for Link<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{SecurityGroup, Subnet};

    #[test]
    fn test_link_key_carries_target_kind() {
        let link: Link<SecurityGroup> = Link::named("masters.k8s.local");
        assert_eq!(link.key().to_string(), "SecurityGroup/masters.k8s.local");
    }

    #[test]
    fn test_links_compare_by_name() {
        let a: Link<Subnet> = Link::named("a.k8s.local");
        assert_eq!(a, a.clone());
        assert_ne!(a, Link::named("b.k8s.local"));
    }

    #[test]
    fn test_link_serializes_as_name() {
        let link: Link<Subnet> = Link::named("a.k8s.local");
        assert_eq!(serde_json::to_value(&link).unwrap(), "a.k8s.local");
    }
}
