//! UI layer: app shell, screen panels, widgets and colors.

pub mod app;
pub mod panels;
pub mod theme;
pub mod widgets;

pub use app::{load_persisted_settings, BattleGuiApp, StartupConfig};
