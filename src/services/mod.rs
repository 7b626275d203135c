//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! The diagnosis pipeline runs `capture` -> `diagnosis` -> `render`, with
//! `analysis_state` holding each session's progress and `analysis` driving
//! the background backend call. `session`, `forum` and `contacts` are the
//! small collaborators around it. Route handlers stay focused on protocol
//! translation and cookie plumbing.

pub mod analysis;
pub mod analysis_state;
pub mod capture;
pub mod contacts;
pub mod diagnosis;
pub mod forum;
pub mod render;
pub mod session;
