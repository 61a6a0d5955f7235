use crate::core::node::NodeId;
use crate::source::FetchError;

/// Supplies the direct dependencies of a node.
pub trait MetadataSource {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError>;
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        (**self).direct_dependencies(id)
    }
}

impl<S: MetadataSource + ?Sized> MetadataSource for Box<S> {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        (**self).direct_dependencies(id)
    }
}
