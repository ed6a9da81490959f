//! Domain modules split by discipline.
//! - `controls`: keyboard bindings feeding the session.
//! - `presentation`: sprites, music, HUD and menus.
//! - `simulation`: levels, puzzles and authoritative game state.

pub mod controls;
pub mod presentation;
pub mod simulation;

pub use controls::InputPlugin;
pub use presentation::UiPlugin;
pub use simulation::{AppState, LevelLibrary, SimPlugin};
