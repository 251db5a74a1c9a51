//! Platform function services — the glue behind each webhook endpoint.

pub mod activity;
pub mod conversations;
pub mod meetings;
pub mod token;
