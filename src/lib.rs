// src/lib.rs

//! wallguard: group wall scam moderation library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
