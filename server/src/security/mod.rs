//! Security administration subsystem.

pub mod handler;

// vim: ts=4
