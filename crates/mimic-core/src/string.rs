//! Immutable text values
//!
//! Text is shared through an `Arc<str>`. Equality and hashing are by content;
//! [`Text::same_allocation`] exposes the allocation identity for callers that
//! need to tell two equal texts apart.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, cheaply clonable string
#[derive(Clone)]
pub struct Text {
    data: Arc<str>,
}

impl Text {
    /// Create a new text value
    pub fn new(s: &str) -> Self {
        Self { data: Arc::from(s) }
    }

    /// Borrow as `&str`
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Copy the content into a new allocation
    pub fn fresh_copy(&self) -> Self {
        Self::new(&self.data)
    }

    /// Check whether two texts share one allocation
    pub fn same_allocation(a: &Text, b: &Text) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.data
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || self.data == other.data
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self {
            data: Arc::from(s),
        }
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.data)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
