/// Kubernetes cluster operations
pub mod cluster;
pub mod resources;

pub use cluster::ClusterManager;
pub use resources::ResourceManager;
