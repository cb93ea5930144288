mod avatar_state_changed_event;

pub use avatar_state_changed_event::AvatarStateChangedEvent;
