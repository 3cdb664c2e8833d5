//! Key tree handling for etcd v2 recursive listings.
//!
//! A backup file holds the store's nested listing verbatim. Restoring needs
//! a flat list of writes instead, since etcd creates intermediate
//! directories on its own when a nested key is written.

mod node;
mod normalize;

pub use node::{BackupDocument, TreeNode};
pub use normalize::{FlatEntry, normalize};
