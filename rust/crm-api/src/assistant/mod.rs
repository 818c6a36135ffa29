//! Content generation gateway.
//!
//! Turns a `{ prompt, content_type, context? }` request into one
//! synchronous OpenAI chat-completions call: the content type selects a
//! system instruction template, the prompt and context become the user
//! message. No retries and no streaming.

pub mod openai;
pub mod templates;

pub use openai::{OpenAiClient, OpenAiSettings};
pub use templates::{system_prompt, user_message};
