pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod data_models;
pub mod forms;
pub mod location;
pub mod renderer;
pub mod sanitize;
pub mod store;
