pub mod sync;
pub mod tabs;
pub mod zoom;

pub use sync::*;
pub use tabs::*;
pub use zoom::*;
