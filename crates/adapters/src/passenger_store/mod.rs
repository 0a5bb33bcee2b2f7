//! Passenger store adapters.

mod json_file;
mod memory;

pub use json_file::JsonFilePassengerStore;
pub use memory::InMemoryPassengerStore;
