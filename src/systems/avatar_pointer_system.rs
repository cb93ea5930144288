use bevy::{
    input::touch::TouchInput,
    prelude::{EventReader, Query, ResMut, With},
    window::{CursorMoved, PrimaryWindow, Window},
};

use crate::resources::PointerPosition;

/// Samples the pointer from any window, the avatar reacts to the cursor even
/// when it is not hovering the avatar itself.
pub fn avatar_pointer_system(
    mut pointer_position: ResMut<PointerPosition>,
    mut cursor_moved_events: EventReader<CursorMoved>,
    mut touch_events: EventReader<TouchInput>,
    query_window: Query<&Window>,
    query_primary_window: Query<&Window, With<PrimaryWindow>>,
) {
    let mut latest = None;

    for event in cursor_moved_events.iter() {
        if let Ok(window) = query_window.get(event.window) {
            latest = Some(PointerPosition::from_window_position(
                event.position,
                window.width(),
                window.height(),
            ));
        }
    }

    if let Ok(window) = query_primary_window.get_single() {
        for event in touch_events.iter() {
            latest = Some(PointerPosition::from_window_position(
                event.position,
                window.width(),
                window.height(),
            ));
        }
    } else {
        touch_events.clear();
    }

    if let Some(latest) = latest {
        if *pointer_position != latest {
            *pointer_position = latest;
        }
    }
}
