mod help;
mod pane;
mod panel;
mod warning;

pub use help::*;
pub use pane::*;
pub use panel::*;
pub use warning::*;
