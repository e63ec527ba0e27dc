//! CLI subcommand implementations for the webcheck binary.

pub mod batch_cmd;
pub mod doctor;
pub mod output;
pub mod verify_cmd;
