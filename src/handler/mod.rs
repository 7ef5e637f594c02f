//! Request handler module
//!
//! Maps GET/HEAD requests onto the virtual filesystem: access gate, path
//! normalization, resolution with canonical redirects, directory listings and
//! content delivery.

pub mod dispatcher;
pub mod error;
pub mod listing;
pub mod normalize;
pub mod request;
pub mod resolver;
pub mod router;

// Re-export main entry points
pub use dispatcher::Dispatcher;
pub use error::ServeError;
pub use request::RequestView;
pub use router::handle_request;
