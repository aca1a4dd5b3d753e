//! Persistence layer. Repositories borrow the shared pool and return
//! `anyhow::Result`, leaving business decisions to the services.

pub mod user_repository;
