//! Graph-local identifiers.
//!
//! A `NodeId` is the dense position of a node inside one `NetworkGraph`, an
//! `EdgeId` the position of a directed edge in its CSR edge arrays.  Both are
//! stable across reprojection of that graph (positions move, ids do not) but
//! mean nothing outside it.  The backend's own identifier for a node is kept
//! separately as its `source_id`.
//!
//! The inner `u32` is `pub` so tests and builders can write `NodeId(3)`.

use std::fmt;

macro_rules! graph_index {
    ($(#[$attr:meta])* $name:ident, $tag:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Marks "not reached" / "not assigned" slots in dense arrays.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "{}"), self.0)
            }
        }
    };
}

graph_index! {
    /// Street-network node (intersection or dead end).
    NodeId, "n"
}

graph_index! {
    /// Directed street-network edge.
    EdgeId, "e"
}
