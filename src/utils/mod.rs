pub mod environment;
pub mod paths;
pub mod timestamps;

pub use environment::{env_path, get_data_dir};
pub use paths::{format_path_with_tilde, safe_open_file, validate_file_size};
pub use timestamps::{AsEpoch, NOT_AVAILABLE, format_timestamp};
