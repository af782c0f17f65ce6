//! Section assembly.
//!
//! This module provides:
//! - [`VaultListSectionsBuilder`]: appends display sections from prepared data
//! - [`as_nested_nodes`]: nesting of `/`-delimited folder and collection names
//! - [`natural_cmp`] and [`sort_by_name`]: the name ordering every section uses

pub mod builder;
pub mod sort;
pub mod tree;

pub use builder::{VaultListSectionsBuilder, ids};
pub use sort::{natural_cmp, sort_by_name};
pub use tree::{DELIMITER, Tree, TreeNode, as_nested_nodes};
