use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::options::MarkerOptions,
    rendering::icon::Bitmap,
    traits::{MarkerHandle, MarkerId},
};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct MarkerState {
    position: LatLng,
    visible: bool,
    attached: bool,
}

/// In-process marker, as added to a [`crate::core::map::ViewportMap`]
#[derive(Debug)]
pub struct Marker {
    id: MarkerId,
    title: Option<String>,
    snippet: Option<String>,
    icon: Option<Bitmap>,
    draggable: bool,
    anchor: (f32, f32),
    flat: bool,
    state: Mutex<MarkerState>,
}

impl Marker {
    pub fn new(id: MarkerId, position: LatLng) -> Self {
        Self::from_options(id, &MarkerOptions::new(position))
    }

    pub fn from_options(id: MarkerId, options: &MarkerOptions) -> Self {
        Self {
            id,
            title: options.title.clone(),
            snippet: options.snippet.clone(),
            icon: options.icon.clone(),
            draggable: options.draggable,
            anchor: options.anchor,
            flat: options.flat,
            state: Mutex::new(MarkerState {
                position: options.position,
                visible: options.visible,
                attached: true,
            }),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn snippet(&self) -> Option<&str> {
        self.snippet.as_deref()
    }

    pub fn icon(&self) -> Option<&Bitmap> {
        self.icon.as_ref()
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    pub fn bounds(&self) -> LatLngBounds {
        let position = self.position();
        LatLngBounds::new(position, position)
    }

    pub fn options(&self) -> serde_json::Value {
        let state = self.snapshot();
        serde_json::json!({
            "id": self.id,
            "position": {
                "lat": state.position.lat,
                "lng": state.position.lng
            },
            "title": self.title,
            "snippet": self.snippet,
            "draggable": self.draggable,
            "flat": self.flat,
            "visible": state.visible,
        })
    }

    fn snapshot(&self) -> MarkerState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MarkerState)) {
        match self.state.lock() {
            Ok(mut state) => apply(&mut state),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }
}

impl MarkerHandle for Marker {
    fn id(&self) -> MarkerId {
        self.id
    }

    fn position(&self) -> LatLng {
        self.snapshot().position
    }

    fn set_position(&self, position: LatLng) {
        self.update(|state| state.position = position);
    }

    fn is_visible(&self) -> bool {
        self.snapshot().visible
    }

    fn set_visible(&self, visible: bool) {
        self.update(|state| state.visible = visible);
    }

    fn is_attached(&self) -> bool {
        self.snapshot().attached
    }

    fn remove(&self) {
        self.update(|state| {
            state.attached = false;
            state.visible = false;
        });
    }
}
