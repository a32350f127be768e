mod common;
mod orchestrator;
mod pipeline;
