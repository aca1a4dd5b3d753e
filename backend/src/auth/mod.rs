//! Authentication module for the user credential lifecycle.
//!
//! This module provides sign-up with email verification, sign-in, and
//! password reset via emailed one-time codes, issuing JWTs as cookies.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
