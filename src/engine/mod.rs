pub mod conversation;
pub mod input;
pub mod protocol;
pub mod session;
pub mod worker;

pub mod chunker;
pub mod llm_client;
pub mod prompt_builder;
pub mod response_parser;
