pub mod config;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod error;
pub mod feed;
pub mod http;
pub mod install;
pub mod package;
pub mod properties;
pub mod resolver;
pub mod storage;
pub mod unpack;
pub mod version;

pub use error::{ProvisionError, Result};
pub use version::Version;
