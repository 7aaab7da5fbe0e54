//! Bridge between the egui thread and the async diagnosis client.

pub mod commands;
pub mod runtime;
