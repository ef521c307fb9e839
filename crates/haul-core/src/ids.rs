//! Typed identifiers.
//!
//! Node and edge IDs are distinct types so a `NodeId` can never be passed
//! where an `EdgeId` is expected.  The inner integer is `pub` so dense
//! per-node arrays can be indexed with `id.index()`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel for "no such entity".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A truck (or any other agent) registered with the simulation.
    pub struct AgentId(u32);
}

typed_id! {
    /// A road-network vertex.
    pub struct NodeId(u32);
}

typed_id! {
    /// A directed road-network edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// A roadside building (parking, gas station, depot).  Facilities are
    /// keyed by the ID of the building they occupy.
    pub struct BuildingId(u32);
}
