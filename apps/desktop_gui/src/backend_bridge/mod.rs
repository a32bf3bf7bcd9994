//! Bridge between the egui thread and the tokio backend worker.

pub mod commands;
pub mod runtime;
