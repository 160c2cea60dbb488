pub mod material;
pub mod object;
pub mod pool;
pub mod primitives;
pub mod serialization;
pub mod transform;

pub use material::{MaterialData, TextureSlots};
pub use object::{
    LineVertex, Mesh, Object2D, Object3D, Object3DLine, ObjectFlags, ShaderSet, Tessellation,
    TessellationType, Triangle, Vertex,
};
pub use pool::{Named, NamedPool, PoolError, MAX_NAME_LEN};
pub use serialization::{load_scene_from_file, save_scene_to_file, SceneDocument, SerializationError};
pub use transform::{BoundingSphere, Transform};
