#![forbid(unsafe_code)]

mod client;
mod error;
mod types;

pub use client::{ChecksClient, ChecksConfig, DEFAULT_API_URL};
pub use error::{Error, Result};
pub use types::{CheckConclusion, CheckOutput, CheckRun};
