//! Feature modules: the verification challenge and the newsletter signup that
//! it gates.

pub mod challenge;
pub mod newsletter;
