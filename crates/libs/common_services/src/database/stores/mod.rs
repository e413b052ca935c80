mod event_store;
mod face_job_store;
mod face_profile_store;
mod media_store;

pub use event_store::*;
pub use face_job_store::*;
pub use face_profile_store::*;
pub use media_store::*;
