use crate::prelude::Result;
use crate::proxmox::Proxmox;
use crate::proxmox::types::{StorageRef, UniqueProcessId};
use std::sync::Arc;

/// Outcome of [`ensure_iso`].
///
#[derive(Debug, PartialEq)]
pub enum IsoState {
    /// The ISO already exists on the storage, nothing was started.
    Present { storage: String },
    /// A download task was started; the UPID can be polled elsewhere.
    Downloading {
        storage: String,
        upid: UniqueProcessId,
    },
}

/// Makes sure an ISO is available on a node, downloading it if necessary.
///
/// Finds the first ISO-capable storage on the node, checks whether the ISO is
/// already there, and otherwise asks Proxmox to download it from the source
/// URL. The started task is not awaited.
///
/// # Arguments
///
/// * `proxmox_client`: Client for interacting with the Proxmox API.
/// * `node`: Name of the target Proxmox node.
/// * `filename`: Filename of the ISO to make available.
/// * `source_url`: URL to download the ISO from when it is missing.
///
/// # Returns
///
/// Where the ISO lives and whether a download task was started.
///
pub async fn ensure_iso(
    proxmox_client: &Arc<dyn Proxmox + Send + Sync>,
    node: &str,
    filename: &str,
    source_url: &str,
) -> Result<IsoState> {
    let storage_name = proxmox_client.find_iso_storage(node).await?;
    tracing::debug!(target: "service", %storage_name, "Found ISO-capable storage");

    let storage = StorageRef::new(node, &storage_name);
    if proxmox_client.has_iso(storage.clone(), filename).await? {
        tracing::info!(target: "service", filename, "ISO already present, skipping download");
        return Ok(IsoState::Present {
            storage: storage_name,
        });
    }

    let upid = proxmox_client
        .download_iso(storage, filename, source_url)
        .await?;
    tracing::info!(target: "service", filename, ?upid, "Proxmox download task started");

    Ok(IsoState::Downloading {
        storage: storage_name,
        upid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FAKE_UPID: &str = "UPID:pve:12345678:90ABCDEF:12345678:imgcopy:0:root@pam:";

    /// Test double that reports a fixed presence state and counts downloads.
    struct FakeProxmox {
        present: bool,
        downloads: AtomicUsize,
    }

    impl FakeProxmox {
        fn new(present: bool) -> Arc<Self> {
            Arc::new(Self {
                present,
                downloads: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Proxmox for FakeProxmox {
        async fn find_iso_storage(&self, _node: &str) -> Result<String> {
            Ok("local".to_owned())
        }

        async fn has_iso(&self, _storage: StorageRef, _filename: &str) -> Result<bool> {
            Ok(self.present)
        }

        async fn download_iso(
            &self,
            _storage: StorageRef,
            _filename: &str,
            _url: &str,
        ) -> Result<UniqueProcessId> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            Ok(UniqueProcessId::from(FAKE_UPID))
        }
    }

    /// Test double whose storage discovery always fails.
    struct NoStorageProxmox;

    #[async_trait]
    impl Proxmox for NoStorageProxmox {
        async fn find_iso_storage(&self, node: &str) -> Result<String> {
            Err(Error::NotFound(format!(
                "ISO-capable storage on node '{node}'"
            )))
        }

        async fn has_iso(&self, _storage: StorageRef, _filename: &str) -> Result<bool> {
            unreachable!("discovery failed first")
        }

        async fn download_iso(
            &self,
            _storage: StorageRef,
            _filename: &str,
            _url: &str,
        ) -> Result<UniqueProcessId> {
            unreachable!("discovery failed first")
        }
    }

    #[tokio::test]
    async fn ensure_iso_skips_download_when_present() {
        // Arrange
        let fake = FakeProxmox::new(true);
        let client: Arc<dyn Proxmox + Send + Sync> = fake.clone();

        // Act
        let result = ensure_iso(
            &client,
            "pve",
            "ubuntu.iso",
            "http://images.example.com/ubuntu.iso",
        )
        .await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(
            result.unwrap(),
            IsoState::Present {
                storage: "local".to_owned()
            }
        );
        assert_eq!(fake.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ensure_iso_starts_download_when_absent() {
        // Arrange
        let fake = FakeProxmox::new(false);
        let client: Arc<dyn Proxmox + Send + Sync> = fake.clone();

        // Act
        let result = ensure_iso(
            &client,
            "pve",
            "ubuntu.iso",
            "http://images.example.com/ubuntu.iso",
        )
        .await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(
            result.unwrap(),
            IsoState::Downloading {
                storage: "local".to_owned(),
                upid: UniqueProcessId::from(FAKE_UPID),
            }
        );
        assert_eq!(fake.downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ensure_iso_propagates_discovery_failure() {
        // Arrange
        let client: Arc<dyn Proxmox + Send + Sync> = Arc::new(NoStorageProxmox);

        // Act
        let result = ensure_iso(
            &client,
            "pve",
            "ubuntu.iso",
            "http://images.example.com/ubuntu.iso",
        )
        .await;

        // Assert
        assert!(result.is_err());
        match result.unwrap_err() {
            Error::NotFound(message) => assert!(message.contains("pve")),
            error => panic!("unexpected error: {}", error),
        }
    }
}
