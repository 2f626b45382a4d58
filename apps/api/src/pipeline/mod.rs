// Process-emails pipeline: the orchestrator and its HTTP entry point.

pub mod handlers;
pub mod orchestrator;
