//! Logical resource identifiers
//!
//! A board names its hardware roles with a closed enum. The enum's
//! position is the join key across the identity, configuration and
//! context tables.

use core::fmt;

/// Logical resource id of a board
///
/// Implemented by [`resource_ids!`](crate::resource_ids). `ALL` lists every
/// id in ascending index order and `index()` is the position in `ALL`.
pub trait ResourceId: Copy + Eq + fmt::Debug + 'static {
    /// Number of resources (the table size)
    const COUNT: usize;

    /// Every id, ascending
    const ALL: &'static [Self];

    /// Table index of this id (`0..COUNT`)
    fn index(self) -> usize;

    /// Resource name for logs
    fn name(self) -> &'static str;

    /// Convert a raw index back into an id
    ///
    /// Returns `None` for anything outside `0..COUNT`.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Declare a board's logical resource enum
///
/// Usage:
/// ```
/// pinboard_core::resource_ids! {
///     /// Pins on my board
///     pub enum MyPin {
///         Led,
///         Button,
///     }
/// }
///
/// use pinboard_core::ResourceId;
/// assert_eq!(MyPin::COUNT, 2);
/// assert_eq!(MyPin::from_index(1), Some(MyPin::Button));
/// assert_eq!(MyPin::from_index(2), None);
/// ```
#[macro_export]
macro_rules! resource_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::resource::ResourceId for $name {
            const COUNT: usize = [$( $name::$variant ),+].len();
            const ALL: &'static [Self] = &[$( $name::$variant ),+];

            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::resource_ids! {
        enum Role {
            First,
            Second,
            Third,
        }
    }

    #[test]
    fn test_count_and_order() {
        assert_eq!(Role::COUNT, 3);
        assert_eq!(Role::ALL, &[Role::First, Role::Second, Role::Third]);
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn test_from_index_rejects_sentinel() {
        assert_eq!(Role::from_index(0), Some(Role::First));
        assert_eq!(Role::from_index(2), Some(Role::Third));
        assert_eq!(Role::from_index(Role::COUNT), None);
        assert_eq!(Role::from_index(usize::MAX), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(Role::Second.name(), "Second");
    }
}
