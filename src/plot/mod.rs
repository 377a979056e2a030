//! Scatter plot of a sampled frontier: volatility on the x-axis, return on the y-axis.
//!
//! Every sample is a small dot, the selected sample is a larger star drawn on top. Axis bounds are
//! the observed range padded by 10% on each side.

use std::path::Path;

use anyhow::Result;
use image::{ImageFormat, Rgb, RgbImage};

use crate::portfolio::Frontier;

const PADDING: f64 = 0.1;
const TICKS: u32 = 5;

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([60, 60, 60]);
    pub const CORNFLOWER_BLUE: Rgb<u8> = Rgb([100, 149, 237]);
    pub const ORANGE_RED: Rgb<u8> = Rgb([255, 69, 0]);
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub background: Rgb<u8>,
    pub axis_color: Rgb<u8>,
    pub sample_color: Rgb<u8>,
    pub best_color: Rgb<u8>,
    pub point_radius: u32,
    pub best_radius: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 50,
            background: colors::WHITE,
            axis_color: colors::DARK_GRAY,
            sample_color: colors::CORNFLOWER_BLUE,
            best_color: colors::ORANGE_RED,
            point_radius: 1,
            best_radius: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Observed range widened by 10% each side. A flat range is widened around its value so that
    /// the axis never has zero length.
    pub fn padded(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min > max {
            return Self { min: 0.0, max: 1.0 };
        }

        let range = max - min;
        if range == 0.0 {
            let pad = if min == 0.0 { 1e-9 } else { min.abs() * PADDING };
            return Self {
                min: min - pad,
                max: max + pad,
            };
        }
        Self {
            min: min - range * PADDING,
            max: max + range * PADDING,
        }
    }

    /// Position of `value` within the bounds, 0.0 at min and 1.0 at max.
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

struct Canvas<'a> {
    img: RgbImage,
    config: &'a PlotConfig,
    x_bounds: Bounds,
    y_bounds: Bounds,
}

impl<'a> Canvas<'a> {
    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let plot_w = self.config.width.saturating_sub(2 * self.config.margin) as f64;
        let plot_h = self.config.height.saturating_sub(2 * self.config.margin) as f64;
        let px = self.config.margin as f64 + self.x_bounds.fraction(x) * plot_w;
        let py = self.config.height.saturating_sub(self.config.margin) as f64
            - self.y_bounds.fraction(y) * plot_h;
        (px.round() as i64, py.round() as i64)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    fn draw_axes(&mut self) {
        let color = self.config.axis_color;
        let m = self.config.margin as i64;
        let right = self.config.width.saturating_sub(self.config.margin) as i64;
        let bottom = self.config.height.saturating_sub(self.config.margin) as i64;

        for x in m..=right {
            self.put(x, bottom, color);
        }
        for y in m..=bottom {
            self.put(m, y, color);
        }

        for i in 0..=TICKS as i64 {
            let tx = m + (right - m) * i / TICKS as i64;
            let ty = bottom - (bottom - m) * i / TICKS as i64;
            for d in 1..=5 {
                self.put(tx, bottom + d, color);
                self.put(m - d, ty, color);
            }
        }
    }

    fn draw_dot(&mut self, cx: i64, cy: i64, radius: u32, color: Rgb<u8>) {
        let r = radius as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn draw_star(&mut self, cx: i64, cy: i64, radius: u32, color: Rgb<u8>) {
        let outer = radius as f64;
        let inner = outer * 0.4;
        let vertices: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
                (r * angle.cos(), r * angle.sin())
            })
            .collect();

        let r = radius as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if inside_polygon(dx as f64, dy as f64, &vertices) {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }
}

fn inside_polygon(x: f64, y: f64, vertices: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn render(frontier: &Frontier, config: &PlotConfig) -> RgbImage {
    let samples = frontier.samples();
    let mut canvas = Canvas {
        img: RgbImage::from_pixel(config.width, config.height, config.background),
        config,
        x_bounds: Bounds::padded(samples.iter().map(|s| s.volatility)),
        y_bounds: Bounds::padded(samples.iter().map(|s| s.ret)),
    };

    canvas.draw_axes();
    for sample in samples {
        let (x, y) = canvas.to_pixel(sample.volatility, sample.ret);
        canvas.draw_dot(x, y, config.point_radius, config.sample_color);
    }

    let best = frontier.best();
    let (x, y) = canvas.to_pixel(best.volatility, best.ret);
    canvas.draw_star(x, y, config.best_radius, config.best_color);
    canvas.img
}

pub fn save(frontier: &Frontier, path: &Path, config: &PlotConfig) -> Result<()> {
    render(frontier, config).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
