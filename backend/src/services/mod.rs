//! Module for services that talk to external collaborators.
//!
//! Currently this is the notifier that delivers verification and password
//! reset codes by email.

pub mod email_service;
