pub mod admin;
pub mod meta;
pub mod phase;
pub mod project;
pub mod user;
pub mod video;
