// Action endpoints
//
// Configure and disconnect requests for each integrated platform. All of
// them return an `ActionReply` on success and `Error::Rejected` with the
// backend's message on failure.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::debug;

use crate::client::KollectClient;
use crate::error::Error;
use crate::models::{ActionReply, AzureCliCheck, KubeconfigUpload};

impl KollectClient {
    /// Submit JSON credentials for a platform.
    ///
    /// `POST /api/configure/{platform}`
    pub async fn configure<B: Serialize + Sync>(
        &self,
        platform: &str,
        credentials: &B,
    ) -> Result<ActionReply, Error> {
        debug!(platform, "submitting platform credentials");
        self.post_action(&format!("configure/{platform}"), credentials)
            .await
    }

    /// Submit a kubeconfig, either as file contents or a backend-side path.
    ///
    /// `POST /api/configure/kubernetes` (multipart)
    pub async fn configure_kubernetes(
        &self,
        upload: &KubeconfigUpload,
    ) -> Result<ActionReply, Error> {
        let form = match upload {
            KubeconfigUpload::File {
                file_name,
                contents,
            } => {
                debug!(file_name, bytes = contents.len(), "uploading kubeconfig");
                let part = Part::bytes(contents.clone()).file_name(file_name.clone());
                Form::new().part("kubeconfig", part)
            }
            KubeconfigUpload::Path(path) => {
                debug!(path = %path.display(), "submitting kubeconfig path");
                Form::new().text("configPath", path.display().to_string())
            }
        };
        self.post_multipart("configure/kubernetes", form).await
    }

    /// Check whether the Azure CLI is installed on the backend host.
    ///
    /// `GET /api/check-azure-cli`
    pub async fn azure_cli_installed(&self) -> Result<bool, Error> {
        let check: AzureCliCheck = self.get("check-azure-cli").await?;
        debug!(installed = check.installed, "azure cli check");
        Ok(check.installed)
    }

    /// Authenticate Azure through the backend's CLI session.
    ///
    /// `POST /api/configure/azure-cli`
    pub async fn configure_azure_cli(&self) -> Result<ActionReply, Error> {
        debug!("requesting azure cli login");
        self.post_empty("configure/azure-cli").await
    }

    /// Disconnect a platform. The backend treats this as idempotent.
    ///
    /// `POST /api/disconnect/{platform}`
    pub async fn disconnect(&self, platform: &str) -> Result<ActionReply, Error> {
        debug!(platform, "requesting disconnect");
        self.post_empty(&format!("disconnect/{platform}")).await
    }
}

/// Read a kubeconfig from disk into an upload.
pub fn kubeconfig_from_file(path: &std::path::Path) -> Result<KubeconfigUpload, Error> {
    let contents = std::fs::read(path).map_err(|source| Error::File {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "kubeconfig".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(KubeconfigUpload::File {
        file_name,
        contents,
    })
}
