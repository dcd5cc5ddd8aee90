// ── Platform credentials ──
//
// Credential payloads submitted through the gateway. Validation is local
// and runs before any network call; a payload that fails here never
// reaches the backend.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::CoreError;
use crate::model::Platform;

/// Kubeconfig source for the Kubernetes platform.
#[derive(Debug, Clone)]
pub enum KubeconfigSource {
    /// File contents uploaded from the local machine.
    Upload { file_name: String, contents: Vec<u8> },
    /// A path on the backend host.
    BackendPath(PathBuf),
}

impl KubeconfigSource {
    /// Read a local kubeconfig for upload.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        match kollect_api::kubeconfig_from_file(path)? {
            kollect_api::KubeconfigUpload::File {
                file_name,
                contents,
            } => Ok(Self::Upload {
                file_name,
                contents,
            }),
            kollect_api::KubeconfigUpload::Path(path) => Ok(Self::BackendPath(path)),
        }
    }
}

/// Credentials for one platform.
#[derive(Debug, Clone)]
pub enum PlatformCredentials {
    Aws {
        access_key: String,
        secret_key: SecretString,
    },
    Azure {
        subscription_id: String,
        tenant_id: String,
        client_id: String,
        client_secret: SecretString,
    },
    /// Reuse the Azure CLI session on the backend host.
    AzureCli,
    Kubernetes(KubeconfigSource),
    Veeam {
        server_url: String,
        username: String,
        password: SecretString,
    },
}

impl PlatformCredentials {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Aws { .. } => Platform::Aws,
            Self::Azure { .. } | Self::AzureCli => Platform::Azure,
            Self::Kubernetes(_) => Platform::Kubernetes,
            Self::Veeam { .. } => Platform::Veeam,
        }
    }

    /// Check required fields without touching the network.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Aws {
                access_key,
                secret_key,
            } => {
                required("access key", access_key)?;
                required_secret("secret key", secret_key)
            }
            Self::Azure {
                subscription_id,
                tenant_id,
                client_id,
                client_secret,
            } => {
                required("subscription id", subscription_id)?;
                required("tenant id", tenant_id)?;
                required("client id", client_id)?;
                required_secret("client secret", client_secret)
            }
            Self::AzureCli => Ok(()),
            Self::Kubernetes(KubeconfigSource::Upload { contents, .. }) => {
                if contents.iter().all(u8::is_ascii_whitespace) {
                    return Err(CoreError::validation("kubeconfig", "file is empty"));
                }
                Ok(())
            }
            Self::Kubernetes(KubeconfigSource::BackendPath(path)) => {
                if path.as_os_str().is_empty() {
                    return Err(CoreError::validation("kubeconfig path", "must not be empty"));
                }
                Ok(())
            }
            Self::Veeam {
                server_url,
                username,
                password,
            } => {
                required("server URL", server_url)?;
                let parsed = Url::parse(server_url.trim())
                    .map_err(|e| CoreError::validation("server URL", &e.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(CoreError::validation(
                        "server URL",
                        "must use http or https",
                    ));
                }
                required("username", username)?;
                required_secret("password", password)
            }
        }
    }
}

fn required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "is required"));
    }
    Ok(())
}

fn required_secret(field: &str, value: &SecretString) -> Result<(), CoreError> {
    required(field, value.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn aws_requires_both_keys() {
        let creds = PlatformCredentials::Aws {
            access_key: "AKIA".into(),
            secret_key: secret("  "),
        };
        let err = creds.validate().expect_err("blank secret");
        assert!(err.to_string().contains("secret key"));

        let creds = PlatformCredentials::Aws {
            access_key: "AKIA".into(),
            secret_key: secret("s"),
        };
        assert!(creds.validate().is_ok());
        assert_eq!(creds.platform(), Platform::Aws);
    }

    #[test]
    fn azure_cli_needs_nothing_local() {
        assert!(PlatformCredentials::AzureCli.validate().is_ok());
        assert_eq!(PlatformCredentials::AzureCli.platform(), Platform::Azure);
    }

    #[test]
    fn veeam_server_url_must_be_http() {
        let creds = |url: &str| PlatformCredentials::Veeam {
            server_url: url.into(),
            username: "admin".into(),
            password: secret("pw"),
        };
        assert!(creds("https://vbr01:9419").validate().is_ok());
        assert!(matches!(
            creds("vbr01").validate(),
            Err(CoreError::Validation { .. })
        ));
        assert!(creds("ftp://vbr01").validate().is_err());
    }

    #[test]
    fn empty_kubeconfig_is_rejected() {
        let creds = PlatformCredentials::Kubernetes(KubeconfigSource::Upload {
            file_name: "config".into(),
            contents: b"\n  \n".to_vec(),
        });
        assert!(creds.validate().is_err());

        let creds = PlatformCredentials::Kubernetes(KubeconfigSource::BackendPath(PathBuf::new()));
        assert!(creds.validate().is_err());
    }

    #[test]
    fn unreadable_kubeconfig_is_a_validation_error() {
        let err = KubeconfigSource::from_file(Path::new("/nonexistent/kollect/kubeconfig"))
            .expect_err("missing file");
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "kubeconfig"));
    }
}
