// src/models/mod.rs

pub mod chat;
pub mod note;
pub mod question;
pub mod result;
pub mod topic;
pub mod user;
