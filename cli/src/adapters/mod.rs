/// Azure OpenAI transport.
pub mod azure;
