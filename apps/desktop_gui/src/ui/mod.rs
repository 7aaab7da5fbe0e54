pub mod app;
pub mod view_model;
