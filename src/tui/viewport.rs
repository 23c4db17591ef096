//! Pan and zoom over the graph's world coordinates.

use crate::graph::Point;

pub const MIN_ZOOM: f64 = 0.15;
pub const MAX_ZOOM: f64 = 2.5;
pub const FIT_PADDING: f64 = 0.45;

/// Half the visible world width at zoom 1.
const BASE_HALF_WIDTH: f64 = 800.0;
/// World units moved per pan step at zoom 1.
const PAN_STEP: f64 = 80.0;
const ZOOM_STEP: f64 = 1.2;
/// Room reserved around node centers when fitting.
const NODE_MARGIN: f64 = 120.0;

/// Visible window onto the graph.
///
/// `aspect` is visible world height over width; terminal cells are about
/// twice as tall as they are wide, so a `w x h` cell canvas uses `2h / w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: Point,
    zoom: f64,
    aspect: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Point::new(600.0, 400.0),
            zoom: 1.0,
            aspect: 0.5,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the aspect from the canvas size in cells.
    pub fn set_area(&mut self, width: u16, height: u16) {
        if width > 0 && height > 0 {
            self.aspect = (2.0 * f64::from(height) / f64::from(width)).max(0.05);
        }
    }

    pub fn center_on(&mut self, point: Point) {
        self.center = point;
    }

    fn half_width(&self) -> f64 {
        BASE_HALF_WIDTH / self.zoom
    }

    fn half_height(&self) -> f64 {
        self.half_width() * self.aspect
    }

    /// Visible `[min, max]` world x range.
    pub fn x_bounds(&self) -> [f64; 2] {
        let h = self.half_width();
        [self.center.x - h, self.center.x + h]
    }

    /// Visible `[min, max]` world y range (y grows downward).
    pub fn y_bounds(&self) -> [f64; 2] {
        let h = self.half_height();
        [self.center.y - h, self.center.y + h]
    }

    pub fn contains(&self, p: Point) -> bool {
        let [x0, x1] = self.x_bounds();
        let [y0, y1] = self.y_bounds();
        (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)
    }

    /// Moves by whole steps; positive `dy` moves down.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let step = PAN_STEP / self.zoom;
        self.center = Point::new(self.center.x + dx * step, self.center.y + dy * step);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Centers on the box and zooms so it fits with `FIT_PADDING` to spare.
    pub fn fit(&mut self, min: Point, max: Point) {
        self.center = min.lerp(max, 0.5);
        let half_w = (max.x - min.x) / 2.0 + NODE_MARGIN;
        let half_h = (max.y - min.y) / 2.0 + NODE_MARGIN;
        let needed = half_w.max(half_h / self.aspect) * (1.0 + FIT_PADDING);
        self.set_zoom(BASE_HALF_WIDTH / needed);
    }
}
