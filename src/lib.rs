pub mod allocation;
pub mod article;
pub mod config;
pub mod digest;
pub mod environment;
pub mod feed;
pub mod logging;
pub mod profile;
pub mod scoring;

pub use article::Article;
pub use config::EngineConfig;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_PROFILE: &str = "profile";
pub const TARGET_DIGEST: &str = "digest";
