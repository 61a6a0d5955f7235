pub mod coordinates;
pub mod node;
pub mod properties;

pub use coordinates::{CoordinateError, Coordinates};
pub use node::NodeId;
pub use properties::{resolve_placeholders, PropertyMap};
