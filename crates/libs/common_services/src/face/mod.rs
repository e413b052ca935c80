mod assemble;
mod dispatch;
mod embedding;
mod recall;
mod refine;
mod trigger;

pub use assemble::*;
pub use dispatch::*;
pub use embedding::*;
pub use recall::*;
pub use refine::*;
pub use trigger::*;
