//! Language model providers implementing `agentdesk_core::model::LanguageModel`.

pub mod openai;
