mod error;
pub mod tables;
mod utils;
mod stores;

pub use error::*;
pub use tables::*;
pub use utils::*;
pub use stores::*;
