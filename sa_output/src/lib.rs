//! Decoded texture cache for Stone Age graphics.
//!
//! Textures are looked up by identifier, decoded from the archive on first
//! use, and written under `<output>/textures/<id>.bin` so later runs restore
//! them without touching the archive again.

pub mod error;
pub mod settings;
pub mod store;
pub mod texture_manager;

pub use error::TextureCacheError;
pub use settings::Settings;
pub use texture_manager::TextureManager;
