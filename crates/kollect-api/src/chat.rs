// Chat relay
//
// The assistant lives entirely on the backend; the client only relays
// messages and reports whether the reply asked for a state refresh.

use serde_json::json;
use tracing::debug;

use crate::client::KollectClient;
use crate::error::Error;
use crate::models::ChatReply;

impl KollectClient {
    /// Send a free-text message to the assistant.
    ///
    /// `POST /api/chat` with `{"message": "..."}`
    pub async fn chat(&self, message: &str) -> Result<ChatReply, Error> {
        debug!(len = message.len(), "sending chat message");
        self.post_json("chat", &json!({ "message": message })).await
    }
}
