pub mod api;
pub mod display;
pub mod state;
