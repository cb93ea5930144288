mod pointer_position;

pub use pointer_position::PointerPosition;
