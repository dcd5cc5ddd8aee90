// ── Backend seam ──
//
// Everything the reconciler and gateway need from the aggregator backend.
// `KollectClient` is the production implementation; tests script their own.

use std::future::Future;

use kollect_api::{
    AwsCredentialsRequest, AzureCredentialsRequest, ChatReply, KollectClient, KubeconfigUpload,
    VeeamCredentialsRequest,
};

use crate::error::CoreError;
use crate::gateway::{KubeconfigSource, PlatformCredentials};
use crate::model::{Platform, Snapshot, StatusReport};

pub trait Backend: Send + Sync + 'static {
    /// `GET /api/data`
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, CoreError>> + Send;

    /// `GET /api/{platform}/status`
    fn fetch_status(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<StatusReport, CoreError>> + Send;

    /// Submit credentials. Returns the backend's message, if any.
    fn configure(
        &self,
        credentials: &PlatformCredentials,
    ) -> impl Future<Output = Result<Option<String>, CoreError>> + Send;

    /// Whether the Azure CLI is installed on the backend host.
    fn azure_cli_installed(&self) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn disconnect(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<Option<String>, CoreError>> + Send;

    fn chat(&self, message: &str) -> impl Future<Output = Result<ChatReply, CoreError>> + Send;
}

impl Backend for KollectClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        let payload = self.fetch_inventory().await?;
        Ok(Snapshot::new(payload))
    }

    async fn fetch_status(&self, platform: Platform) -> Result<StatusReport, CoreError> {
        let status = self.platform_status(platform.slug()).await?;
        Ok(status.into())
    }

    async fn configure(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<Option<String>, CoreError> {
        let reply = match credentials {
            PlatformCredentials::Aws {
                access_key,
                secret_key,
            } => {
                let body = AwsCredentialsRequest {
                    access_key: access_key.trim().to_owned(),
                    secret_key: secret_key.clone(),
                };
                KollectClient::configure(self, Platform::Aws.slug(), &body).await?
            }
            PlatformCredentials::Azure {
                subscription_id,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let body = AzureCredentialsRequest {
                    subscription_id: subscription_id.trim().to_owned(),
                    tenant_id: tenant_id.trim().to_owned(),
                    client_id: client_id.trim().to_owned(),
                    client_secret: client_secret.clone(),
                };
                KollectClient::configure(self, Platform::Azure.slug(), &body).await?
            }
            PlatformCredentials::AzureCli => self.configure_azure_cli().await?,
            PlatformCredentials::Kubernetes(source) => {
                let upload = match source {
                    KubeconfigSource::Upload {
                        file_name,
                        contents,
                    } => KubeconfigUpload::File {
                        file_name: file_name.clone(),
                        contents: contents.clone(),
                    },
                    KubeconfigSource::BackendPath(path) => KubeconfigUpload::Path(path.clone()),
                };
                self.configure_kubernetes(&upload).await?
            }
            PlatformCredentials::Veeam {
                server_url,
                username,
                password,
            } => {
                let body = VeeamCredentialsRequest {
                    server_url: server_url.trim().to_owned(),
                    username: username.trim().to_owned(),
                    password: password.clone(),
                };
                KollectClient::configure(self, Platform::Veeam.slug(), &body).await?
            }
        };
        Ok(reply.message)
    }

    async fn azure_cli_installed(&self) -> Result<bool, CoreError> {
        Ok(KollectClient::azure_cli_installed(self).await?)
    }

    async fn disconnect(&self, platform: Platform) -> Result<Option<String>, CoreError> {
        let reply = KollectClient::disconnect(self, platform.slug()).await?;
        Ok(reply.message)
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, CoreError> {
        Ok(KollectClient::chat(self, message).await?)
    }
}
