//! HTTP API handlers

pub mod config_handlers;
pub mod dto;
pub mod field_handlers;
pub mod health_handlers;
pub mod scan_handlers;
