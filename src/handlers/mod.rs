// src/handlers/mod.rs

pub mod admin;
pub mod registration;
pub mod results;
