//! Runtime module - winit/platform integration
//!
//! - `app` - ApplicationHandler that feeds window events into the registry

pub mod app;

pub use app::ProbeApp;
