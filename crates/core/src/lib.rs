#![forbid(unsafe_code)]

pub mod ids {
    /// Identity of a node row. Stable for the node's lifetime: mutations
    /// shift bounds, never ids.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct NodeId(i64);

    impl NodeId {
        pub fn as_i64(self) -> i64 {
            self.0
        }

        pub fn try_new(value: i64) -> Result<Self, NodeIdError> {
            if value < 1 {
                return Err(NodeIdError::NonPositive);
            }
            Ok(Self(value))
        }
    }

    impl std::fmt::Display for NodeId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum NodeIdError {
        NonPositive,
    }

    impl std::fmt::Display for NodeIdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::NonPositive => write!(f, "node id must be a positive integer"),
            }
        }
    }

    impl std::error::Error for NodeIdError {}
}

pub mod model {
    use crate::ids::NodeId;

    /// A node as surfaced to callers. The parent is derived from interval
    /// containment, not stored; only the root has none.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Node {
        pub id: NodeId,
        pub name: String,
        pub parent_id: Option<NodeId>,
    }

    /// One row of the depth projection, ordered by `lft`.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct TreeRow {
        pub id: NodeId,
        pub name: String,
        pub depth: i64,
    }
}
