pub mod components;
pub mod interface;
pub mod theme;

pub use components::Display;
pub use interface::GameInterface;
pub use theme::{Theme, ThemeManager};
