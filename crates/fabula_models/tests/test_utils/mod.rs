//! Test utilities for fabula model client tests.
//!
//! Builds clients over a scripted transport so no test touches the network.

#![allow(dead_code)]

use fabula_models::{ChatClient, ChatConfig};
use fabula_retry::mock::{Reply, ScriptedTransport};
use fabula_retry::{CallExecutor, RetryConfig};
use serde_json::{Value, json};

pub const CHAT_ROUTE: &str = "/chat/completions";
pub const SPEECH_ROUTE: &str = "/audio/speech";
pub const IMAGE_ROUTE: &str = "/images/generations";

/// Executor over `transport` with the default three attempts, two seconds apart.
pub fn executor(transport: ScriptedTransport) -> CallExecutor<ScriptedTransport> {
    CallExecutor::with_transport(transport, RetryConfig::default())
}

/// Chat client over `transport`.
pub fn chat_client(transport: ScriptedTransport) -> ChatClient<ScriptedTransport> {
    ChatClient::new(executor(transport), "sk-test", ChatConfig::default())
}

/// A 200 chat-completion reply whose first choice carries `content`.
pub fn chat_reply(content: &str) -> Reply {
    Reply::json(
        200,
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        }),
    )
}

/// A chat-completion reply carrying `value` serialized as its content.
pub fn chat_json_reply(value: Value) -> Reply {
    chat_reply(&value.to_string())
}

/// A two-scene script in English and Telugu.
pub fn sample_script() -> Value {
    json!({
        "character_anchor": "A young shepherd boy in a coat of many colors",
        "scenes": [
            {
                "narration": {"en": "Joseph had eleven brothers.", "te": "యోసేపుకు పదకొండు మంది సోదరులు."},
                "visual_action": "Wide shot of a family tent at dusk"
            },
            {
                "narration": {"en": "His father gave him a coat.", "te": "అతని తండ్రి అతనికి ఒక కోటు ఇచ్చాడు."},
                "visual_action": "Close up of an old man handing over a coat"
            },
            {
                "narration": {"en": "The brothers grew jealous."},
                "visual_action": "Medium shot of frowning brothers"
            }
        ],
        "lesson": {"narration": {"en": "Jealousy hurts families."}, "visual_action": "A broken pot"},
        "blessing": {"narration": {"en": "May you be kind."}, "visual_action": "Sunrise over hills"}
    })
}

/// JSON body a recorded attempt carried, if any.
pub fn json_body(request: &fabula_retry::mock::RecordedRequest) -> Value {
    match request.descriptor.payload() {
        Some(fabula_core::Payload::Json(value)) => value.clone(),
        _ => Value::Null,
    }
}
