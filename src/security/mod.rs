//! Input validation and sanitization
//!
//! Three independent stages stand between raw command-line strings and the
//! toast payload:
//!
//! - [`text`]: free text made safe for XML character data
//! - [`path`]: asset paths checked, canonicalized and deny-listed
//! - [`sniffer`]: asset content confirmed from its leading bytes

pub mod error;
pub mod path;
pub mod pattern;
pub mod sniffer;
pub mod text;

pub use error::ValidationError;
pub use path::{validate_path, AssetKind, PathPolicy, VerifiedPath};
pub use sniffer::{confirm_signature, AssetFile, AssetSource, FileSignature, LocalFiles};
pub use text::{sanitize, SanitizedText};
