// kollect-api: Async Rust client for the kollect inventory aggregator backend

pub mod chat;
pub mod client;
pub mod configure;
pub mod error;
pub mod models;
pub mod status;
pub mod transport;

pub use client::KollectClient;
pub use configure::kubeconfig_from_file;
pub use error::Error;
pub use models::{
    AwsCredentialsRequest, AzureCredentialsRequest, ChatReply, KubeconfigUpload,
    PlatformStatusResponse, VeeamCredentialsRequest,
};
pub use transport::{TlsMode, TransportConfig};
