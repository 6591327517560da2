use crate::core::constants::MARKER_ANCHOR;
use crate::core::geo::LatLng;
use crate::rendering::icon::Bitmap;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Plain description of a marker: where it is and what its info window says
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapMarker {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub location: LatLng,
}

impl MapMarker {
    pub fn new(location: LatLng) -> Self {
        Self {
            title: None,
            snippet: None,
            location,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Everything the host needs to add a marker to the map
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: Option<String>,
    pub snippet: Option<String>,
    /// `None` uses the host's default pin
    pub icon: Option<Bitmap>,
    pub draggable: bool,
    /// Hot-spot inside the icon, as fractions of its width and height
    pub anchor: (f32, f32),
    /// Flat markers lie on the map plane and rotate with it
    pub flat: bool,
    pub visible: bool,
}

impl MarkerOptions {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            title: None,
            snippet: None,
            icon: None,
            draggable: false,
            anchor: MARKER_ANCHOR,
            flat: true,
            visible: true,
        }
    }

    /// Options for `marker`, centred on its location and flat on the map
    pub fn from_map_marker(marker: &MapMarker, draggable: bool) -> Result<Self> {
        if !marker.location.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "marker location {:?} is out of range",
                marker.location
            )));
        }

        Ok(Self {
            title: marker.title.clone(),
            snippet: marker.snippet.clone(),
            draggable,
            ..Self::new(marker.location)
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn icon(mut self, icon: Bitmap) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn anchor(mut self, u: f32, v: f32) -> Self {
        self.anchor = (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
        self
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}
