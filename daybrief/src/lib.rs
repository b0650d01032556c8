// Library interface for daybrief modules
// This allows tests and other binaries to import modules

pub mod briefing;
pub mod memory;
pub mod news;
pub mod profile;
pub mod traffic;
pub mod weather;
