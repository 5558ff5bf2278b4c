//! Flow service integration.
//!
//! Provides a reqwest-based client for the hosted flow run API and a
//! cancellable subscription to a run's server-sent event stream.

mod client;
pub mod stream;


pub use client::{FlowClientConfig, FlowError, FlowRun, LangflowClient};
pub use stream::{StreamEvent, StreamSubscription};
