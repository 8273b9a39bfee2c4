pub mod config_port;
pub mod price_port;
pub mod session_port;
pub mod log_port;
