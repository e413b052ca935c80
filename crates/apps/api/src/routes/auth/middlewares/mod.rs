pub mod common;
pub mod organizer;
