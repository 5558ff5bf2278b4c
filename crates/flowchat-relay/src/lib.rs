//! flowchat relay
//!
//! HTTP relay between the chat front ends and a hosted flow service.
//! Serves `POST /api/rag` plus the browser chat page.

pub mod flow;
pub mod routes;
