//! Toast rendering and display

pub mod display;
pub mod payload;

pub use display::show;
pub use payload::{ToastPayload, ToastTemplate};
