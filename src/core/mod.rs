pub mod config;
pub mod timecode;


pub use config::*;
pub use timecode::*;
