// etcd-dump/src/etcd/request.rs
use url::Url;

use crate::errors::{AppError, Result};
use crate::tree::FlatEntry;

/// Builds `<base>/v2/keys<key>`, percent-encoding each key segment.
pub fn keys_url(base: &Url, key: &str) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("{} cannot be used as an etcd base URL", base)))?
        .pop_if_empty()
        .extend(["v2", "keys"])
        // `.` and `..` segments are dropped here; etcd never lists such keys.
        .extend(key.trim_start_matches('/').split('/'));
    Ok(url)
}

/// Form body of a PUT against the keys API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteForm {
    Dir,
    Value(String),
}

impl WriteForm {
    pub fn pairs(&self) -> [(&str, &str); 1] {
        match self {
            WriteForm::Dir => [("dir", "true")],
            WriteForm::Value(value) => [("value", value.as_str())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub key: String,
    pub url: Url,
    pub form: WriteForm,
}

impl WriteRequest {
    pub fn for_entry(base: &Url, entry: &FlatEntry) -> Result<Self> {
        let form = match entry {
            FlatEntry::Key { value, .. } => WriteForm::Value(value.clone()),
            FlatEntry::Dir { .. } => WriteForm::Dir,
        };
        Ok(WriteRequest {
            key: entry.key().to_string(),
            url: keys_url(base, entry.key())?,
            form,
        })
    }
}
