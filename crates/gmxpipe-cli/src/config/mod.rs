mod builder;
mod file;
mod models;

pub use builder::build_config;
pub use file::FileConfig;
pub use models::AppConfig;
