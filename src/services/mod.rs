//! Storage and launcher integration.

pub mod document;
pub mod filter;
pub mod icons;
pub mod persist;
pub mod settings;
