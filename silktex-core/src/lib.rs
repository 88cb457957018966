//! SilkTex Core - Document model, structure extraction, and typesetting
//!
//! This crate contains the core logic for silktex, independent of any
//! user-interface concerns:
//! - Document model with Rope-based text storage
//! - LaTeX structure (outline) extraction
//! - Typesetter selection, detection, and command building
//! - Compile-log scraping
//! - Configuration management

pub mod buildlog;
pub mod compile;
pub mod config;
pub mod detect;
pub mod doc;
pub mod outline;
pub mod typeset;

// Re-export commonly used types
pub use config::Config;
pub use detect::DetectionState;
pub use doc::Document;
pub use outline::{StructureItem, StructureKind};
pub use typeset::{Engine, OutputFormat, TypesetterConfig};
