//! pastebox - a minimal, durable, self-hostable paste and file sharing service
//!
//! A client submits text and/or a binary attachment and receives a short,
//! unguessable identifier that later resolves to the original content.

pub mod blob;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod index;
pub mod observability;
pub mod store;
