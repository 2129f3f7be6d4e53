pub mod capability;
pub mod ctx;
pub mod entity;

pub use capability::{Capability, Renderer};
pub use ctx::EntityCtx;
pub use entity::{BoxedEntity, Entity};
