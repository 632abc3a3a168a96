//! Data types shared by the background and popup halves.

pub mod chat;
pub mod config;
pub mod entry;
pub mod identity;
pub mod profile;
