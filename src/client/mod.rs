#[cfg(test)]
pub(crate) mod fake;
mod http;
mod traits;

pub use http::HttpAgentClient;
pub use traits::*;
