//! Core domain types and logic.

pub mod bar;
pub mod params;
pub mod indicator;
pub mod scanner;
pub mod position;
pub mod manager;
pub mod replay;
pub mod config_validation;
pub mod error;
