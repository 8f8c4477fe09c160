use serde::{Deserialize, Serialize};

/// Separator between the scopes of a node id
pub const SCOPE_SEPARATOR: &str = "::";

/// A collected test as seen by the selector.
///
/// The host owns its items; selection only reads these two names.
pub trait TestItem {
    /// Unique hierarchical identifier, e.g. `tests/test_a.py::TestX::test_one`
    fn full_id(&self) -> &str;

    /// Leaf name, not necessarily unique across the collection
    fn short_name(&self) -> &str;
}

impl<T: TestItem + ?Sized> TestItem for &T {
    fn full_id(&self) -> &str {
        (**self).full_id()
    }

    fn short_name(&self) -> &str {
        (**self).short_name()
    }
}

/// A test identified by its node id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    pub node_id: String,
    pub name: String,
}

impl TestCase {
    pub fn new(node_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            name: name.into(),
        }
    }

    /// Build from a node id; the short name is the last `::` segment,
    /// or the whole id when it has no scopes.
    pub fn from_node_id(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let name = node_id
            .rsplit_once(SCOPE_SEPARATOR)
            .map_or(node_id.as_str(), |(_, leaf)| leaf)
            .to_string();
        Self { node_id, name }
    }
}

impl TestItem for TestCase {
    fn full_id(&self) -> &str {
        &self.node_id
    }

    fn short_name(&self) -> &str {
        &self.name
    }
}
