pub mod api;
pub mod common;
pub mod config;
pub mod dialog;
pub mod errors;
pub mod model;
pub mod notify;
pub mod panel;
pub mod render;
pub mod surface;

pub use api::{CollaborationApi, HttpCollaborationApi};
pub use config::PanelConfig;
pub use panel::{CollaborationPanel, Invalidation, Outcome};
