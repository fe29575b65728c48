//! Neonecy - content backend for the Neonecy agency site
//!
//! This library provides the news and products content API, image uploads
//! and the cookie-based admin session that gates the admin area.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
