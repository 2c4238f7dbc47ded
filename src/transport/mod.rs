pub mod controller;
pub mod events;
pub mod state;

#[cfg(test)]
mod tests;

pub use controller::*;
pub use events::*;
pub use state::*;
