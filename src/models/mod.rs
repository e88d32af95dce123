// src/models/mod.rs

pub mod admin;
pub mod registration;
pub mod test_result;
