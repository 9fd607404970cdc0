//! Controller layer: UI events, view-state transitions, derived views, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
pub mod view;
