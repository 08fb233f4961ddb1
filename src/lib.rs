pub mod error;
pub mod link;
pub mod runtime;
pub mod nodes;
pub mod graph;

pub use error::GraphError;
pub use link::{LinkData, LinkRecord, NamedLink, SerializedLink};
