// mapty-tui/src/app/viewport.rs
use mapty_lib::{Bounds, Coordinates, MAX_ZOOM, MIN_ZOOM};

/// Longitude covered at zoom 0. Wider than the globe so low zooms still
/// fill a wide terminal.
const LNG_SPAN_AT_ZOOM_0: f64 = 1440.0;
/// Room left around fitted bounds.
const FIT_PADDING: f64 = 1.2;
/// Cursor steps across the visible width.
const STEPS_ACROSS: f64 = 40.0;

/// The window of the world the map canvas shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: f64,
}

impl Viewport {
    pub fn centered(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom: f64::from(zoom).clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)),
        }
    }

    /// Largest zoom at which every corner of `bounds` is visible.
    pub fn fit(bounds: Bounds) -> Self {
        let by_lng = (LNG_SPAN_AT_ZOOM_0 / (bounds.lng_span() * FIT_PADDING)).log2();
        let by_lat = (LNG_SPAN_AT_ZOOM_0 / 2.0 / (bounds.lat_span() * FIT_PADDING)).log2();
        let zoom = by_lng
            .min(by_lat)
            .floor()
            .clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM));
        Self {
            center: bounds.center(),
            zoom,
        }
    }

    pub fn lng_span(&self) -> f64 {
        LNG_SPAN_AT_ZOOM_0 / self.zoom.exp2()
    }

    /// Terminal cells are about twice as tall as wide.
    pub fn lat_span(&self) -> f64 {
        self.lng_span() / 2.0
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.lng_span() / 2.0;
        [self.center.lng - half, self.center.lng + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = self.lat_span() / 2.0;
        [self.center.lat - half, self.center.lat + half]
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        (west..=east).contains(&point.lng) && (south..=north).contains(&point.lat)
    }

    /// How far one cursor key press moves, as (lat, lng) degrees.
    pub fn step(&self) -> (f64, f64) {
        (
            self.lat_span() / STEPS_ACROSS,
            self.lng_span() / STEPS_ACROSS,
        )
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM));
    }

    /// Pans just enough to bring `point` back on screen.
    pub fn follow(&mut self, point: Coordinates) {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        if point.lng < west {
            self.center.lng -= west - point.lng;
        } else if point.lng > east {
            self.center.lng += point.lng - east;
        }
        if point.lat < south {
            self.center.lat -= south - point.lat;
        } else if point.lat > north {
            self.center.lat += point.lat - north;
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::centered(Coordinates::new(0.0, 0.0), MIN_ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_shows_every_corner() {
        let bounds = Bounds {
            south_west: Coordinates::new(52.39, 13.06),
            north_east: Coordinates::new(52.53, 13.405),
        };
        let viewport = Viewport::fit(bounds);
        assert!(viewport.contains(bounds.south_west));
        assert!(viewport.contains(bounds.north_east));
        assert!(viewport.zoom > 8.0);
    }

    #[test]
    fn fit_on_single_point_uses_max_zoom() {
        let here = Coordinates::new(52.52, 13.405);
        let viewport = Viewport::fit(Bounds {
            south_west: here,
            north_east: here,
        });
        assert_eq!(viewport.zoom, f64::from(MAX_ZOOM));
        assert_eq!(viewport.center, here);
    }

    #[test]
    fn follow_pans_minimally() {
        let mut viewport = Viewport::centered(Coordinates::new(0.0, 0.0), 10);
        let [_, east] = viewport.x_bounds();
        let outside = Coordinates::new(0.0, east + 0.5);
        viewport.follow(outside);
        assert!(viewport.contains(outside));
        assert!((viewport.center.lng - 0.5).abs() < 1e-9);
        assert_eq!(viewport.center.lat, 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::centered(Coordinates::new(0.0, 0.0), 17);
        viewport.zoom_by(5.0);
        assert_eq!(viewport.zoom, f64::from(MAX_ZOOM));
        viewport.zoom_by(-40.0);
        assert_eq!(viewport.zoom, f64::from(MIN_ZOOM));
    }
}
