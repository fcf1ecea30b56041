//! Scene construction for the infinite grid map.
//!
//! `GridMap` holds what the map shows (user sample, points of interest, outline) plus its own
//! zoom and pan. Every change marks it dirty; `render` then rebuilds the whole `Frame` and hands
//! it to a `Surface`. There is no partial invalidation.

use log::{debug, trace};

use crate::config::MapConfig;
use crate::projection::Projection;
use crate::types::{Coordinate, Rgb, ScreenPoint, Stroke, UserLocationSample, Viewport};
use crate::view::{Gesture, ViewState};

/// Drawing layers, in paint order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Grid,
    Outline,
    Points,
    User,
    Heading,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line { from: ScreenPoint, to: ScreenPoint, stroke: Stroke },
    /// Connected outline through `points`; `closed` joins the last point back to the first.
    Path { points: Vec<ScreenPoint>, closed: bool, stroke: Stroke },
    Disc { center: ScreenPoint, radius: f64, fill: Rgb },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub layer: Layer,
    pub primitive: Primitive,
}

/// One complete redraw: clear to `background`, then paint `commands` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub viewport: Viewport,
    pub background: Rgb,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Primitive> {
        self.commands.iter().filter(move |c| c.layer == layer).map(|c| &c.primitive)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.layer(layer).count()
    }
}

/// Something a frame can be painted on.
pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn paint(&mut self, frame: &Frame);
}

/// Screen-space positions of the grid lines along one axis. The first line sits at
/// `(-offset) mod spacing`, so panning any distance only shifts lines within one period and the
/// line count stays bounded by `extent / spacing`.
pub fn grid_lines(extent: f64, spacing: f64, offset: f64) -> Vec<f64> {
    if !(spacing > 0.0) || !spacing.is_finite() || !extent.is_finite() || !offset.is_finite() {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity((extent / spacing) as usize + 1);
    let mut pos = (-offset).rem_euclid(spacing);
    while pos < extent {
        lines.push(pos);
        pos += spacing;
    }
    lines
}

/// End point of the heading indicator: `length` pixels from `origin`, rotated `heading`
/// degrees clockwise from screen up.
pub fn heading_tip(origin: ScreenPoint, heading: f64, length: f64) -> ScreenPoint {
    let rad = heading.to_radians();
    ScreenPoint::new(origin.x + length * rad.sin(), origin.y - length * rad.cos())
}

pub struct GridMap {
    config: MapConfig,
    view: ViewState,
    user_location: Option<UserLocationSample>,
    /// Reference point used when auto-centring is off.
    pinned: Option<Coordinate>,
    points: Vec<Coordinate>,
    shape: Vec<Coordinate>,
    dirty: bool,
    redraws: u64,
}

impl GridMap {
    pub fn new(config: MapConfig) -> GridMap {
        let view = ViewState::new(config.min_scale);
        GridMap {
            config: config,
            view: view,
            user_location: None,
            pinned: None,
            points: Vec::new(),
            shape: Vec::new(),
            dirty: true,
            redraws: 0,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn user_location(&self) -> Option<&UserLocationSample> {
        self.user_location.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of frames painted so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn set_user_location(&mut self, sample: Option<UserLocationSample>) {
        if self.user_location != sample {
            self.user_location = sample;
            self.dirty = true;
        }
    }

    /// Pin the reference at a real position fix. Only the first finite fix counts, and only
    /// matters when `auto_center` is off.
    pub fn pin_reference(&mut self, fix: Coordinate) {
        if self.pinned.is_none() && fix.latitude.is_finite() && fix.longitude.is_finite() {
            self.pinned = Some(fix);
            if !self.config.auto_center {
                self.dirty = true;
            }
        }
    }

    pub fn set_points(&mut self, points: Vec<Coordinate>) {
        if self.points != points {
            self.points = points;
            self.dirty = true;
        }
    }

    pub fn set_shape(&mut self, shape: Vec<Coordinate>) {
        if self.shape != shape {
            self.shape = shape;
            self.dirty = true;
        }
    }

    pub fn on_pinch(&mut self, reported: f64) {
        if self.view.pinch(reported) {
            self.dirty = true;
        }
    }

    pub fn on_pan(&mut self, dx: Option<f64>, dy: Option<f64>) {
        if self.view.pan(dx, dy) {
            self.dirty = true;
        }
    }

    pub fn on_gesture(&mut self, gesture: &Gesture) {
        if self.view.apply(gesture) {
            self.dirty = true;
        }
    }

    /// Point that lands on the viewport centre.
    pub fn reference(&self) -> Coordinate {
        let user = self.user_location.map(|s| s.position());
        if self.config.auto_center {
            user.unwrap_or_default()
        } else {
            self.pinned.or(user).unwrap_or_default()
        }
    }

    pub fn projection(&self, viewport: Viewport) -> Projection {
        Projection::new(self.reference(),
                        viewport,
                        self.view.scale(),
                        self.config.pixels_per_degree)
    }

    /// Build the full scene for a surface of the given size.
    pub fn frame(&self, viewport: Viewport) -> Frame {
        let style = &self.config.style;
        let scale = self.view.scale();
        let proj = self.projection(viewport);
        let mut commands = Vec::new();

        let spacing = self.config.grid_spacing * scale;
        for x in grid_lines(viewport.width, spacing, self.view.offset_x) {
            commands.push(DrawCommand {
                layer: Layer::Grid,
                primitive: Primitive::Line {
                    from: ScreenPoint::new(x, 0.0),
                    to: ScreenPoint::new(x, viewport.height),
                    stroke: style.grid,
                },
            });
        }
        for y in grid_lines(viewport.height, spacing, self.view.offset_y) {
            commands.push(DrawCommand {
                layer: Layer::Grid,
                primitive: Primitive::Line {
                    from: ScreenPoint::new(0.0, y),
                    to: ScreenPoint::new(viewport.width, y),
                    stroke: style.grid,
                },
            });
        }

        if self.shape.len() >= 2 {
            let points: Vec<ScreenPoint> = self.shape
                .iter()
                .map(|c| proj.project(c))
                .filter(|p| p.is_finite())
                .collect();
            if points.len() >= 2 {
                commands.push(DrawCommand {
                    layer: Layer::Outline,
                    primitive: Primitive::Path {
                        closed: points.len() > 2,
                        points: points,
                        stroke: style.outline,
                    },
                });
            }
        }

        for p in self.points.iter().map(|c| proj.project(c)).filter(|p| p.is_finite()) {
            commands.push(DrawCommand {
                layer: Layer::Points,
                primitive: Primitive::Disc {
                    center: p,
                    radius: self.config.point_radius * scale,
                    fill: style.point,
                },
            });
        }

        if let Some(sample) = self.user_location {
            let at = proj.project(&sample.position());
            if at.is_finite() {
                commands.push(DrawCommand {
                    layer: Layer::User,
                    primitive: Primitive::Disc {
                        center: at,
                        radius: self.config.user_radius * scale,
                        fill: style.user,
                    },
                });
                if !sample.heading.is_nan() {
                    commands.push(DrawCommand {
                        layer: Layer::Heading,
                        primitive: Primitive::Line {
                            from: at,
                            to: heading_tip(at, sample.heading, self.config.heading_length * scale),
                            stroke: style.heading,
                        },
                    });
                }
            }
        }

        Frame {
            viewport: viewport,
            background: style.background,
            commands: commands,
        }
    }

    /// Redraw on `surface` if anything changed since the last paint. A missing surface skips the
    /// draw and leaves the map dirty. Return whether a frame was painted.
    pub fn render(&mut self, surface: Option<&mut dyn Surface>) -> bool {
        if !self.dirty {
            return false;
        }
        let surface = match surface {
            Some(s) => s,
            None => {
                trace!("no surface, skipping draw");
                return false;
            }
        };
        let frame = self.frame(surface.viewport());
        debug!("redraw #{}: {} commands at scale {:.2}, offset ({:.1}, {:.1})",
               self.redraws + 1,
               frame.commands.len(),
               self.view.scale(),
               self.view.offset_x,
               self.view.offset_y);
        surface.paint(&frame);
        self.dirty = false;
        self.redraws += 1;
        true
    }
}
