//! Configuration module for Recap.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    GeneralSettings, RequestDefaults, ServerSettings, Settings, TimeoutSettings, ToolSettings,
    TranscriptionSettings,
};
