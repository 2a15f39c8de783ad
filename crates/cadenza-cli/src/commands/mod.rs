pub mod browse;
pub mod build;
pub mod config;
pub mod recommend;
pub mod songs;
pub mod status;

pub use browse::run_browse;
pub use build::run_build;
pub use recommend::run_recommend;
pub use songs::list_songs;
pub use status::show_status;
