//! Page models for the screens under test

pub mod login;
pub mod projects;

pub use login::LoginPage;
pub use projects::ProjectsPage;
