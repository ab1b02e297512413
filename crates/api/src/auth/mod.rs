//! Authentication primitives.
//!
//! Sign-in happens at the external identity provider; this service only
//! verifies the bearer tokens it issues. See [`jwt`].

pub mod jwt;
