#![deny(unsafe_code)]

//! Parlor desktop front end: app shell, chat regions and settings window,
//! rendered with GPUI over the headless state in `parlor-session`.
pub mod app;
/// Sidebar, message feed, composer and the view that coordinates them.
pub mod chat;
/// Settings persistence and the settings window.
pub mod settings;
