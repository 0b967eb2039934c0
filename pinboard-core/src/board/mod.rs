//! Board definitions
//!
//! Each board names its resources with [`resource_ids!`](crate::resource_ids)
//! and lists one [`Declaration`](crate::Declaration) per resource.

pub mod blue_pill;
