//! Account core of the points site: field validation, password hashing,
//! the user/admin account store, startup bootstrap, and the HTTP layer
//! that exposes them.

pub mod admin;
pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod state;
