pub mod auth;
pub mod carddav_path;
