pub mod catalog;
pub mod coordinator;
pub mod manifest;
pub mod resolver;
pub mod upstream;

pub use catalog::CatalogProxy;
pub use coordinator::{Coordinator, SingleFlight};
pub use manifest::ManifestBuilder;
pub use resolver::IdResolver;
pub use upstream::{HttpUpstream, Upstream, UpstreamRequest};
