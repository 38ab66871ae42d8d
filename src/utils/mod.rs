//! Process, filesystem and HTTP helpers shared by the tasks.

pub mod exec;
pub mod host;
pub mod mime;
pub mod path;
