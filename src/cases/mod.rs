mod directory;
mod escalation;
mod flow;
mod scan;
mod source;
mod types;

pub use directory::*;
pub use escalation::*;
pub use flow::*;
pub use scan::*;
pub use source::*;
pub use types::*;
