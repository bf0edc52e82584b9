//! Embassy async tasks

pub mod init;

pub use init::init_task;
