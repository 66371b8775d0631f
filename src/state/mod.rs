/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Local persistence of the gallery and login flag (store.rs)
/// - Artwork record lifecycle (gallery.rs)
/// - Login redirect handling (session.rs)
/// - The page/view controller (app.rs)

pub mod app;
pub mod data;
pub mod gallery;
pub mod session;
pub mod store;
