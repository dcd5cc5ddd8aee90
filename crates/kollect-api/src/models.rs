// Wire types for the aggregator backend.
//
// The bulk inventory endpoint is deliberately left as a raw JSON object;
// interpretation happens in `kollect-core`. Everything else is typed here.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Raw bulk inventory: category name -> backend value.
pub type InventoryPayload = serde_json::Map<String, serde_json::Value>;

/// `GET /api/{platform}/status`
///
/// Missing flags decode as `false` so a partial body never reads as connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatusResponse {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub has_data: bool,
}

/// `GET /api/check-azure-cli`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AzureCliCheck {
    #[serde(default)]
    pub installed: bool,
}

/// Successful reply from a configure/disconnect endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionReply {
    /// Optional human-readable message from the backend.
    pub message: Option<String>,
}

/// `POST /api/chat` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    /// Set when the assistant changed backend state and the dashboard
    /// should re-read it.
    #[serde(default, rename = "updateUI")]
    pub update_ui: bool,
}

// ── Configure request bodies ────────────────────────────────────────

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// `POST /api/configure/aws`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentialsRequest {
    pub access_key: String,
    #[serde(serialize_with = "expose")]
    pub secret_key: SecretString,
}

/// `POST /api/configure/azure`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureCredentialsRequest {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    #[serde(serialize_with = "expose")]
    pub client_secret: SecretString,
}

/// `POST /api/configure/veeam`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeeamCredentialsRequest {
    pub server_url: String,
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Kubeconfig delivered to `POST /api/configure/kubernetes` as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigUpload {
    /// Upload file contents (form field `kubeconfig`).
    File { file_name: String, contents: Vec<u8> },
    /// Point the backend at a path on its own filesystem (form field `configPath`).
    Path(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn status_flags_default_to_false() {
        let status: PlatformStatusResponse = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(status, PlatformStatusResponse::default());

        let status: PlatformStatusResponse =
            serde_json::from_value(json!({ "isConnected": true })).expect("decode");
        assert!(status.is_connected);
        assert!(!status.has_data);
    }

    #[test]
    fn aws_request_uses_camel_case_and_exposes_secret() {
        let body = AwsCredentialsRequest {
            access_key: "AKIA123".into(),
            secret_key: SecretString::from("s3cr3t".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("encode"),
            json!({ "accessKey": "AKIA123", "secretKey": "s3cr3t" })
        );
    }

    #[test]
    fn chat_reply_reads_update_ui_flag() {
        let reply: ChatReply =
            serde_json::from_value(json!({ "response": "done", "updateUI": true }))
                .expect("decode");
        assert!(reply.update_ui);
        assert_eq!(reply.response, "done");
    }
}
