use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Generic wrapper for all successful Proxmox API responses.
///
/// Proxmox API consistently wraps its successful responses in a JSON object
/// with a single `data` field. This struct models that wrapper.
///
/// # Example JSON
///
/// ```json
/// "data": {
///     ...
/// }
/// ```
///
#[derive(Deserialize)]
pub struct Response<T> {
    pub data: T,
}

/// Type-safe representation of a Proxmox Unique Process ID (`UPID`).
///
/// This is a new-type wrapper around a `String` to prevent accidental misuse
/// of a plain string where a UPID is expected. The UPID identifies the
/// asynchronous server-side task started by an API call; callers poll its
/// status elsewhere.
///
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct UniqueProcessId(String);

impl UniqueProcessId {
    /// Returns the inner string of the UPID.
    ///
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for UniqueProcessId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UniqueProcessId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// -----------------------------------------------------------------------------

/// Reference to a named storage pool on a Proxmox node.
///
/// # Fields
///
/// * `node`: Name of the Proxmox node where the storage lives (e.g., "pve").
/// * `storage`: Name of the storage pool (e.g., "local").
///
#[derive(Debug, Clone)]
pub struct StorageRef {
    pub node: String,
    pub storage: String,
}

impl StorageRef {
    /// Creates a new reference to a storage pool.
    ///
    pub fn new(node: &str, storage: &str) -> Self {
        Self {
            node: node.to_owned(),
            storage: storage.to_owned(),
        }
    }

    /// Percent-encode the node name to make it safe for use in a URL path.
    ///
    pub fn encoded_node(&self) -> String {
        utf8_percent_encode(&self.node, NON_ALPHANUMERIC).to_string()
    }

    /// Percent-encode the storage name to make it safe for use in a URL path.
    ///
    pub fn encoded_storage(&self) -> String {
        utf8_percent_encode(&self.storage, NON_ALPHANUMERIC).to_string()
    }
}

// -----------------------------------------------------------------------------

/// One element of the storage index returned by `GET /nodes/{node}/storage`.
///
/// The shape of this listing varies across Proxmox versions and storage
/// plugins, so every field is decoded leniently: a missing field, a `null`,
/// or a value of the wrong JSON type becomes `None` instead of failing the
/// whole decode.
///
/// # Fields
///
/// * `storage`: Primary identifier of the storage pool.
/// * `name`: Alternative identifier used by some configurations.
/// * `content`: Content types the storage accepts (e.g., "iso", "vztmpl").
///
#[derive(Debug, Deserialize)]
pub struct StorageEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub storage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub content: Option<Vec<String>>,
}

impl StorageEntry {
    /// Identifier of the storage pool, with `storage` preferred over `name`.
    /// The first non-empty value wins.
    ///
    pub fn ident(&self) -> Option<&str> {
        [self.storage.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|ident| !ident.is_empty())
    }

    /// Whether the storage advertises support for `iso` content.
    ///
    pub fn supports_iso(&self) -> bool {
        self.content
            .as_ref()
            .is_some_and(|kinds| kinds.iter().any(|kind| kind == "iso"))
    }
}

/// One element of a storage content listing returned by
/// `GET /nodes/{node}/storage/{storage}/content`. Decoded with the same
/// lenient rules as [`StorageEntry`].
///
/// # Fields
///
/// * `volid`: Volume identifier, often composed as `storage:path/filename`.
/// * `name`: Bare filename of the volume.
///
#[derive(Debug, Deserialize)]
pub struct ContentEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub volid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

impl ContentEntry {
    /// Whether this volume holds `filename`. The `volid` is tested first,
    /// matching either exactly or by suffix to tolerate composite
    /// `storage:path/filename` identifiers, then `name` by equality.
    ///
    pub fn matches(&self, filename: &str) -> bool {
        if let Some(volid) = &self.volid {
            if volid == filename || volid.ends_with(filename) {
                return true;
            }
        }
        self.name.as_deref() == Some(filename)
    }
}

// -----------------------------------------------------------------------------

/// Deserializes any JSON value, keeping it only when it is a string.
///
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_owned))
}

/// Deserializes any JSON value, keeping the string elements when it is an
/// array and discarding it otherwise.
///
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(items) = value.as_array() else {
        return Ok(None);
    };
    Ok(Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
    ))
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_entry_prefers_storage_over_name() {
        let entry: StorageEntry =
            serde_json::from_value(json!({"storage": "local", "name": "backup"})).unwrap();

        assert_eq!(entry.ident(), Some("local"));
    }

    #[test]
    fn storage_entry_falls_back_to_name() {
        let entry: StorageEntry = serde_json::from_value(json!({"name": "backup"})).unwrap();

        assert_eq!(entry.ident(), Some("backup"));
    }

    #[test]
    fn storage_entry_skips_empty_storage() {
        let entry: StorageEntry =
            serde_json::from_value(json!({"storage": "", "name": "backup"})).unwrap();

        assert_eq!(entry.ident(), Some("backup"));
    }

    #[test]
    fn storage_entry_without_identifier() {
        let entry: StorageEntry =
            serde_json::from_value(json!({"content": ["iso"]})).unwrap();

        assert_eq!(entry.ident(), None);
        assert!(entry.supports_iso());
    }

    #[test]
    fn storage_entry_tolerates_wrong_types() {
        let entry: StorageEntry =
            serde_json::from_value(json!({"storage": 7, "name": null, "content": "iso"}))
                .unwrap();

        assert_eq!(entry.ident(), None);
        assert!(!entry.supports_iso());
    }

    #[test]
    fn storage_entry_ignores_non_string_content_items() {
        let entry: StorageEntry =
            serde_json::from_value(json!({"storage": "local", "content": [42, "iso"]})).unwrap();

        assert!(entry.supports_iso());
    }

    #[test]
    fn content_entry_matches_volid_suffix() {
        let entry: ContentEntry =
            serde_json::from_value(json!({"volid": "local:iso/ubuntu.iso"})).unwrap();

        assert!(entry.matches("ubuntu.iso"));
        assert!(!entry.matches("debian.iso"));
    }

    #[test]
    fn content_entry_matches_volid_exactly() {
        let entry: ContentEntry = serde_json::from_value(json!({"volid": "ubuntu.iso"})).unwrap();

        assert!(entry.matches("ubuntu.iso"));
    }

    #[test]
    fn content_entry_matches_name_without_volid() {
        let entry: ContentEntry = serde_json::from_value(json!({"name": "ubuntu.iso"})).unwrap();

        assert!(entry.matches("ubuntu.iso"));
        assert!(!entry.matches("ubuntu"));
    }

    #[test]
    fn storage_ref_encodes_path_segments() {
        let storage = StorageRef::new("pve", "local-lvm");

        assert_eq!(storage.encoded_node(), "pve");
        assert_eq!(storage.encoded_storage(), "local%2Dlvm");
    }
}
