//! Hosted text-completion endpoint access.

pub mod client;
