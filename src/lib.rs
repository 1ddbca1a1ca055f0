//! toastguard
//!
//! Windows toast notifications from the command line, with every argument
//! treated as hostile until proven otherwise.
//!
//! ## Pipeline
//!
//! - **Text sanitizer**: message, title and source become XML-safe character
//!   data, with length limits applied before anything is stripped
//! - **Path validator**: icon and audio paths must match a strict allow-list
//!   grammar, survive canonicalization without traversal tokens, and stay
//!   out of system directories
//! - **Content sniffer**: asset files must carry a real WAV or PNG header and
//!   fit a per-kind size ceiling
//!
//! ## Failure policy
//!
//! - Bad text and any suspicious path abort the run
//! - A well-formed asset path whose file is missing or not what it claims is
//!   dropped and the toast is shown without it

pub mod core;
pub mod error;
pub mod platform;
pub mod security;
pub mod toast;

// Re-exports
pub use crate::core::config::{AssetLimits, ConfigError, ToastConfig};
pub use crate::core::request::{AudioSetting, Category, NotificationRequest, RawRequest, RequestGuard};
pub use crate::error::{ToastError, ToastResult};
pub use crate::security::{
    confirm_signature, sanitize, validate_path, AssetFile, AssetKind, AssetSource, FileSignature, LocalFiles,
    PathPolicy, SanitizedText, ValidationError, VerifiedPath,
};
pub use crate::toast::{ToastPayload, ToastTemplate};
