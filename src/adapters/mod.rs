pub mod file_config_adapter;
pub mod csv_price_adapter;
pub mod file_session_adapter;
pub mod csv_log_adapter;
