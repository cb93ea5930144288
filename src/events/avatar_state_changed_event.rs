use bevy::prelude::{Entity, Event};

use crate::{
    morph::Expression,
    motion::{ActivityState, RimLight},
};

/// Sent when an avatar's activity state or expression changes, so the host
/// can restyle its lighting.
#[derive(Event, Clone, Debug)]
pub struct AvatarStateChangedEvent {
    pub entity: Entity,
    pub state: ActivityState,
    pub expression: Expression,
    pub rim_light: RimLight,
}
