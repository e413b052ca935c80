mod event;
mod face_job;
mod face_profile;
mod gallery_user;
mod media;

pub use event::*;
pub use face_job::*;
pub use face_profile::*;
pub use gallery_user::*;
pub use media::*;
