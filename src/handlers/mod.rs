// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod cbt;
pub mod chat;
pub mod diagram;
pub mod notes;
pub mod organizer;
pub mod profile;
pub mod quiz;
pub mod session;
