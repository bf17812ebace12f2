pub mod banner;
pub mod config;
pub mod consts;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod spinner;
pub mod tracer;

pub use config::{Config, Settings};
pub use error::{ConfigurationError, RemoteCallError};
pub use pipeline::QueryPipeline;
