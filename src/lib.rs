pub mod cli;
pub mod config;
pub mod error;
pub mod proxmox;
pub mod services;
pub mod telemetry;

pub mod prelude {
    pub use crate::error::{Error, ProxmoxError, Result};

    pub use crate::proxmox::Proxmox;
}
