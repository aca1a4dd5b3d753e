//! Collection of small helpers used by the credential lifecycle: verification
//! code generation, password hashing and JWT issuance.

pub mod jwt;
pub mod password;
pub mod verification_code;
