// Kitsune image transformation gateway library

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod image_optimizer;
pub mod logging;
pub mod metrics;
pub mod origin;
pub mod pipeline;
pub mod security;
pub mod watermark;
