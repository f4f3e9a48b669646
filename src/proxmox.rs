pub mod client;
pub mod types;

// -----------------------------------------------------------------------------

use crate::prelude::Result;
use crate::proxmox::types::*;
use async_trait::async_trait;

#[async_trait]
pub trait Proxmox {
    /// Returns the name of the first storage on `node` that advertises
    /// support for `iso` content.
    async fn find_iso_storage(&self, node: &str) -> Result<String>;

    /// Checks whether `storage` already holds an ISO named `filename`.
    async fn has_iso(&self, storage: StorageRef, filename: &str) -> Result<bool>;

    /// Starts a server-side download of `filename` from `url` into `storage`
    /// and returns the UPID of the task without waiting for it.
    async fn download_iso(
        &self,
        storage: StorageRef,
        filename: &str,
        url: &str,
    ) -> Result<UniqueProcessId>;
}
