//! Core abstractions for Agentdesk: the action envelope, domain records, and the
//! contracts for every external collaborator (model, record store, vault, agent factory).

pub mod action;
pub mod agent;
pub mod context;
pub mod conversation;
pub mod dispatch;
pub mod model;
pub mod storage;
pub mod title;
pub mod vault;
pub mod wallet;
