use crate::prelude::{Error, ProxmoxError, Result};
use crate::proxmox::Proxmox;
use crate::proxmox::types::*;
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::OnceCell;

/// Concrete implementation of the `Proxmox` trait using `reqwest` crate.
///
/// Translates the abstract operations defined in the `Proxmox` trait into
/// actual HTTP API calls and manages the state required to communicate with a
/// Proxmox VE server.
///
pub struct ProxmoxClient {
    client: OnceCell<Client>,
    url: String,
    auth_header: SecretString,
}

impl ProxmoxClient {
    /// Creates a new instance of the Proxmox client.
    ///
    /// # Arguments
    ///
    /// * `url`: URL of the Proxmox API.
    /// * `auth_header`: The full, pre-formatted authorization header string.
    ///
    pub fn new(url: String, auth_header: SecretString) -> Result<Self> {
        Ok(Self {
            client: OnceCell::new(),
            url,
            auth_header,
        })
    }

    /// Lazily initializes and returns a reference to the `reqwest::Client`.
    ///
    /// If the client has not been initialized yet, it will be built on the
    /// first call with default headers (including Authorization). Subsequent
    /// calls will return the existing client.
    ///
    async fn get_client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                let mut auth_header = HeaderValue::from_str(self.auth_header.expose_secret())?;
                auth_header.set_sensitive(true);

                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, auth_header);

                Client::builder()
                    .default_headers(headers)
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true)
                    .use_rustls_tls()
                    .tls_built_in_root_certs(false)
                    .min_tls_version(reqwest::tls::Version::TLS_1_0)
                    .build()
                    .map_err(Error::from)
            })
            .await
    }

    /// Generic helper method to perform a request to the Proxmox API.
    ///
    /// Handles client initialization, request building, sending the request,
    /// and processing the response. Successful responses are decoded from the
    /// standard Proxmox `data` envelope; a body that cannot be decoded is
    /// reported with the failed operation and the original parse error.
    ///
    /// # Types
    ///
    /// * `B`: Type of the request form body, which must be serializable.
    /// * `D`: Type of the response data, which must be deserializable.
    ///
    /// # Arguments
    ///
    /// * `method`: HTTP method to use for the request.
    /// * `path`: API endpoint path.
    /// * `body`: Optional form parameters.
    /// * `error_var`: Specific error to use if the API call fails.
    ///
    /// # Returns
    ///
    /// Deserialized data from the Proxmox API response.
    ///
    async fn make_request<B, D>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
        error_var: ProxmoxError,
    ) -> Result<D>
    where
        B: Serialize,
        for<'de> D: Deserialize<'de>,
    {
        let client = self.get_client().await?;
        let url = format!("{}{}", self.url, path);

        let mut request = client.request(method, &url);
        if let Some(body) = body {
            request = request.form(&body);
        }
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                serde_json::from_str::<Response<D>>(&body)
                    .map(|response| response.data)
                    .map_err(|error| Error::Decode(error_var, error))
            }
            status => {
                let text = response.text().await?;
                Err(Error::Proxmox(error_var, status, text))
            }
        }
    }
}

#[async_trait]
impl Proxmox for ProxmoxClient {
    async fn find_iso_storage(&self, node: &str) -> Result<String> {
        let path = format!("/nodes/{}/storage", utf8_percent_encode(node, NON_ALPHANUMERIC));
        let entries: Vec<StorageEntry> = self
            .make_request(Method::GET, &path, None::<()>, ProxmoxError::Storages)
            .await?;

        // First match in listing order wins, there is no "best" storage.
        entries
            .iter()
            .find_map(|entry| entry.ident().filter(|_| entry.supports_iso()))
            .map(str::to_owned)
            .ok_or_else(|| Error::NotFound(format!("ISO-capable storage on node '{node}'")))
    }

    async fn has_iso(&self, storage: StorageRef, filename: &str) -> Result<bool> {
        let path = format!(
            "/nodes/{}/storage/{}/content",
            storage.encoded_node(),
            storage.encoded_storage()
        );
        let entries: Vec<ContentEntry> = self
            .make_request(Method::GET, &path, None::<()>, ProxmoxError::Content)
            .await?;

        Ok(entries.iter().any(|entry| entry.matches(filename)))
    }

    async fn download_iso(
        &self,
        storage: StorageRef,
        filename: &str,
        url: &str,
    ) -> Result<UniqueProcessId> {
        let path = format!(
            "/nodes/{}/storage/{}/download",
            storage.encoded_node(),
            storage.encoded_storage()
        );
        let params = HashMap::from([
            ("content", "iso".to_owned()),
            ("filename", filename.to_owned()),
            ("url", url.to_owned()),
        ]);
        let data: Value = self
            .make_request(Method::POST, &path, Some(params), ProxmoxError::Download)
            .await?;

        // The task identifier arrives either as a bare string or nested under
        // an `upid` field, depending on the Proxmox version.
        if let Value::String(upid) = &data {
            return Ok(UniqueProcessId::from(upid.as_str()));
        }
        if let Some(Value::String(upid)) = data.get("upid") {
            return Ok(UniqueProcessId::from(upid.as_str()));
        }
        Err(Error::UnexpectedDownload(data))
    }
}
