//! Infrastructure layer - Store backends, embedding providers and services

pub mod cache;
pub mod embedding;
pub mod logging;
pub mod observability;
pub mod services;
