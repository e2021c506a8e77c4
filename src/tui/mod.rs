pub mod app;
pub mod input;
pub mod menu;
pub mod render;
pub mod theme;

pub use app::run;
