//! The `"lat,lng"` location token used on the wire, in storage and for display.

use serde::{Deserialize, Serialize};

const NAVIGATION_BASE: &str = "https://www.google.com/maps/dir/?api=1";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn token(&self) -> String {
        encode(self.lat, self.lng)
    }

    /// Rounded form for people; never stored.
    pub fn display(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }

    pub fn navigation_url(&self) -> String {
        format!("{NAVIGATION_BASE}&destination={},{}", self.lat, self.lng)
    }
}

pub fn encode(lat: f64, lng: f64) -> String {
    format!("{lat},{lng}")
}

/// Anything that is not exactly two finite numbers yields `None`; legacy
/// free-text locations land here routinely.
pub fn decode(token: &str) -> Option<Coordinates> {
    let mut parts = token.split(',');
    let lat = parse_component(parts.next()?)?;
    let lng = parse_component(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinates { lat, lng })
}

fn parse_component(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Deep link to turn-by-turn directions, if the token decodes.
pub fn navigation_url(token: &str) -> Option<String> {
    decode(token).map(|coords| coords.navigation_url())
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Smallest box holding every point; `None` for an empty set.
    pub fn fit<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        for point in points {
            bounds.south_west.lat = bounds.south_west.lat.min(point.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(point.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(point.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(point.lng);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}
