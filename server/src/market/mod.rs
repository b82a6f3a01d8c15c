//! Market data subsystem.

pub mod handler;

// vim: ts=4
