mod avatar_animation_system;
mod avatar_pointer_system;

pub use avatar_animation_system::avatar_animation_system;
pub use avatar_pointer_system::avatar_pointer_system;
