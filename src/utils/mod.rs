pub mod agent_toml;
pub mod config;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use fd_limit::{max_open_fds, usable_fds, warn_if_permits_exceed_fd_limit};
pub use logger::setup_logging;
