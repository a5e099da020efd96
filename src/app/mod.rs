pub mod controller;
pub mod event;
pub mod input;
pub mod render;
pub mod state;

pub use controller::{Controller, Flow};
pub use event::{AppEvent, InputEvent};
pub use state::AppState;
