pub mod banners;
pub mod ending_panel;
pub mod game_over_panel;
pub mod hud_panel;
pub mod intro_panel;
pub mod mission_panel;
