// HTTP routes
pub mod health;
pub mod scan;

pub use health::*;
pub use scan::*;
