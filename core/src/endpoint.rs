//! Logical API endpoints resolved to relative paths.

use std::fmt;

/// A resource collection, or a single item within one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Collection { resource: String },
    Item { resource: String, id: String },
}

impl Endpoint {
    pub fn collection(resource: impl Into<String>) -> Self {
        Endpoint::Collection {
            resource: resource.into(),
        }
    }

    pub fn item(resource: impl Into<String>, id: impl ToString) -> Self {
        Endpoint::Item {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Relative path appended verbatim to the client's base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Collection { resource } => resource.clone(),
            Endpoint::Item { resource, id } => format!("{resource}/{id}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Collection { resource } => f.write_str(resource),
            Endpoint::Item { resource, id } => write!(f, "{resource}/{id}"),
        }
    }
}
