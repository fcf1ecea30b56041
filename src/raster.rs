use std::path::Path;

use imagefmt::{ColFmt, ColType};
use num::ToPrimitive;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::render::{Frame, Layer, Primitive, Surface};
use crate::types::{Rgb, ScreenPoint, Stroke, Viewport};

/// RGB pixel buffer that frames are painted on. Rows are stored top to bottom.
#[derive(Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

/// Round a screen coordinate to a pixel index. NaN and infinities have no pixel.
#[inline]
fn to_px(v: f64) -> Option<i64> {
    v.round().to_i64()
}

/// Clip segment a-b to the rectangle spanned by lo and hi (Liang-Barsky). None when the
/// segment misses it entirely.
fn clip(a: ScreenPoint, b: ScreenPoint, lo: ScreenPoint, hi: ScreenPoint)
        -> Option<(ScreenPoint, ScreenPoint)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0;
    let mut t1 = 1.0;
    for &(p, q) in &[(-dx, a.x - lo.x), (dx, hi.x - a.x), (-dy, a.y - lo.y), (dy, hi.y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = f64::max(t0, r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = f64::min(t1, r);
        }
    }
    Some((ScreenPoint::new(a.x + t0 * dx, a.y + t0 * dy),
          ScreenPoint::new(a.x + t1 * dx, a.y + t1 * dy)))
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width: width,
            height: height,
            pixels: vec![255; width * height * 3],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Immutable access to the RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Write the canvas to an image file; the encoder is chosen from the extension.
    pub fn save<P: AsRef<Path>>(&self, p: P) -> Result<()> {
        imagefmt::write(p,
                        self.width,
                        self.height,
                        ColFmt::RGB,
                        &self.pixels,
                        ColType::Auto)
            .map_err(|e| Error::Image(format!("{:?}", e)))
    }

    #[inline]
    fn put(&mut self, x: i64, y: i64, c: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 3;
        self.pixels[i] = c.0;
        self.pixels[i + 1] = c.1;
        self.pixels[i + 2] = c.2;
    }

    /// Stamp a square pen of the stroke width centred on (x, y).
    fn stamp(&mut self, x: f64, y: f64, stroke: &Stroke) {
        let (cx, cy) = match (to_px(x), to_px(y)) {
            (Some(cx), Some(cy)) => (cx, cy),
            _ => return,
        };
        let half = (stroke.width / 2.0).floor().to_i64().unwrap_or(0).max(0);
        for dy in -half..half + 1 {
            for dx in -half..half + 1 {
                self.put(cx + dx, cy + dy, stroke.color);
            }
        }
    }

    /// Step from a toward b one pixel at a time, marking every cell on the way.
    fn line(&mut self, a: ScreenPoint, b: ScreenPoint, stroke: &Stroke) {
        if !a.is_finite() || !b.is_finite() {
            return;
        }
        let margin = stroke.width + 1.0;
        let lo = ScreenPoint::new(-margin, -margin);
        let hi = ScreenPoint::new(self.width as f64 + margin, self.height as f64 + margin);
        let (a, b) = match clip(a, b, lo, hi) {
            Some(seg) => seg,
            None => return,
        };
        let max_abs_diff = f64::max((b.x - a.x).abs(), (b.y - a.y).abs());
        if max_abs_diff == 0.0 {
            self.stamp(a.x, a.y, stroke);
            return;
        }
        let x_step = (b.x - a.x) / max_abs_diff;
        let y_step = (b.y - a.y) / max_abs_diff;
        for i in 0..max_abs_diff.ceil() as usize + 1 {
            let t = f64::min(i as f64, max_abs_diff);
            self.stamp(a.x + x_step * t, a.y + y_step * t, stroke);
        }
    }

    fn disc(&mut self, center: ScreenPoint, radius: f64, fill: Rgb) {
        let (cx, cy, r) = match (to_px(center.x), to_px(center.y), radius.ceil().to_i64()) {
            (Some(cx), Some(cy), Some(r)) => (cx, cy, r.max(0)),
            _ => return,
        };
        let r2 = radius.max(0.5) * radius.max(0.5);
        // Only visit the part of the bounding square that is on the canvas.
        let (w, h) = (self.width as i64, self.height as i64);
        for dy in i64::max(-r, -cy)..i64::min(r, h - 1 - cy) + 1 {
            for dx in i64::max(-r, -cx)..i64::min(r, w - 1 - cx) + 1 {
                if (dx as f64).powi(2) + (dy as f64).powi(2) <= r2 {
                    self.put(cx + dx, cy + dy, fill);
                }
            }
        }
    }

    /// Clear and paint the grid layer row by row in parallel. Grid lines are axis aligned, so
    /// each row only needs the vertical line columns plus whether a horizontal line crosses it.
    fn paint_background(&mut self, frame: &Frame) {
        let mut columns = Vec::new();
        let mut rows = Vec::new();
        let mut grid_color = frame.background;
        for p in frame.layer(Layer::Grid) {
            if let Primitive::Line { from, to, stroke } = *p {
                grid_color = stroke.color;
                if from.x == to.x {
                    columns.extend(to_px(from.x).filter(|x| *x >= 0 && *x < self.width as i64));
                } else if from.y == to.y {
                    rows.extend(to_px(from.y).filter(|y| *y >= 0 && *y < self.height as i64));
                }
            }
        }
        let background = frame.background;
        let width = self.width;
        self.pixels.par_chunks_mut(width * 3).enumerate().for_each(|(y, row)| {
            let fill = if rows.contains(&(y as i64)) {
                grid_color
            } else {
                background
            };
            for px in row.chunks_mut(3) {
                px[0] = fill.0;
                px[1] = fill.1;
                px[2] = fill.2;
            }
            for &x in &columns {
                let i = x as usize * 3;
                row[i] = grid_color.0;
                row[i + 1] = grid_color.1;
                row[i + 2] = grid_color.2;
            }
        });
    }
}

impl Surface for Canvas {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f64, self.height as f64)
    }

    fn paint(&mut self, frame: &Frame) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.paint_background(frame);
        for cmd in frame.commands.iter().filter(|c| c.layer != Layer::Grid) {
            match cmd.primitive {
                Primitive::Line { from, to, ref stroke } => self.line(from, to, stroke),
                Primitive::Path { ref points, closed, ref stroke } => {
                    for (a, b) in points.iter().zip(points.iter().skip(1)) {
                        self.line(*a, *b, stroke);
                    }
                    if closed && points.len() > 2 {
                        self.line(points[points.len() - 1], points[0], stroke);
                    }
                }
                Primitive::Disc { center, radius, fill } => self.disc(center, radius, fill),
            }
        }
    }
}
