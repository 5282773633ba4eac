//! Rendering layer of ppulse: terminal image-protocol negotiation, the
//! image fallback chain, the responsive layout engine, section formatters,
//! and the one-shot surfaces (banner, starship one-liners).
//!
//! Everything here is a read-only consumer of the core cache; the only
//! state this crate owns is the in-memory rendered-output LRU.

pub mod banner;
mod error;
pub mod image;
pub mod layout;
mod lru;
pub mod protocol;
pub mod sections;
mod sparkline;
pub mod starship;
mod style;

pub use error::RenderError;
pub use lru::RenderedOutputCache;
pub use sparkline::sparkline;
pub use style::Palette;
