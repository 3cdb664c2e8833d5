//! Client side of the etcd v2 keys API.

mod client;
mod request;
#[cfg(test)]
pub(crate) mod testing;

pub use client::EtcdClient;
pub use request::{WriteRequest, keys_url};
