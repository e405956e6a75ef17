//! Core library for mailsweep: data model, session persistence, and the
//! gateway client for the remote subscription-management service.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod models;
pub mod session;
