pub mod json_dir_provider;
pub mod static_provider;

pub use json_dir_provider::JsonDirFactProvider;
pub use static_provider::StaticFactProvider;
