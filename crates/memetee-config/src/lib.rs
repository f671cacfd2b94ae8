#![allow(clippy::must_use_candidate)]

pub mod contact;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod memegen;
pub mod mockup;
pub mod rate_limit;
pub mod server;

use serde::Deserialize;

pub use contact::*;
pub use cors::*;
pub use health::*;
pub use memegen::*;
pub use mockup::*;
pub use rate_limit::*;
pub use server::*;

/// Top-level MemeTee configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Meme generation pipeline configuration
    #[serde(default)]
    pub memegen: MemeGenConfig,
    /// T-shirt mockup configuration
    #[serde(default)]
    pub mockup: MockupConfig,
    /// Contact form configuration
    #[serde(default)]
    pub contact: ContactConfig,
}
