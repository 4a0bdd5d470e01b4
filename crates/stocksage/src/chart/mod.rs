//! Line chart of a closing-price series, written as PNG

mod font;

use crate::error::Result;
use crate::series::PriceSeries;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use font::{draw_text, draw_text_vertical, text_width};

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([220, 220, 220]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
}

const MARGIN_LEFT: i64 = 130;
const MARGIN_RIGHT: i64 = 30;
const MARGIN_TOP: i64 = 50;
const MARGIN_BOTTOM: i64 = 70;
const TEXT_SCALE: u32 = 2;
const PRICE_TICKS: i64 = 5;
const DATE_TICKS: i64 = 4;

/// Chart dimensions and colors
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub line: Rgb<u8>,
    pub grid: Rgb<u8>,
    pub ink: Rgb<u8>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            background: colors::WHITE,
            line: colors::BLUE,
            grid: colors::LIGHT_GRAY,
            ink: colors::BLACK,
        }
    }
}

/// Chart title for a ticker
pub fn title(symbol: &str) -> String {
    format!("{} STOCK PRICE OVER LAST YEAR", symbol.to_uppercase())
}

/// Pixel rectangle holding the plotted line
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl PlotArea {
    fn new(config: &ChartConfig) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: i64::from(config.width) - MARGIN_RIGHT,
            bottom: i64::from(config.height) - MARGIN_BOTTOM,
        }
    }

    fn width(self) -> i64 {
        self.right - self.left
    }

    fn height(self) -> i64 {
        self.bottom - self.top
    }
}

/// Value-to-pixel mapping for both axes
struct Scale {
    area: PlotArea,
    first: i64,
    last: i64,
    low: f64,
    high: f64,
}

impl Scale {
    fn x(&self, timestamp: i64) -> i64 {
        if self.last == self.first {
            return self.area.left + self.area.width() / 2;
        }
        let t = (timestamp - self.first) as f64 / (self.last - self.first) as f64;
        self.area.left + (t * self.area.width() as f64).round() as i64
    }

    fn y(&self, price: f64) -> i64 {
        let t = (price - self.low) / (self.high - self.low);
        self.area.bottom - (t * self.area.height() as f64).round() as i64
    }
}

/// Lowest and highest finite close, padded by 5% of the span
fn price_bounds(closes: &[f64]) -> (f64, f64) {
    let finite = closes.iter().copied().filter(|c| c.is_finite());
    let (low, high) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c), hi.max(c))
    });

    if low > high {
        return (0.0, 1.0);
    }
    if (high - low).abs() < f64::EPSILON {
        return (low - 1.0, high + 1.0);
    }
    let pad = (high - low) * 0.05;
    (low - pad, high + pad)
}

/// Bresenham line between two points
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        font::put(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_horizontal_line(img: &mut RgbImage, y: i64, x1: i64, x2: i64, color: Rgb<u8>) {
    draw_line(img, (x1, y), (x2, y), color);
}

fn draw_vertical_line(img: &mut RgbImage, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
    draw_line(img, (x, y1), (x, y2), color);
}

fn text_width_px(text: &str) -> i64 {
    i64::from(text_width(text, TEXT_SCALE))
}

fn text_height_px() -> i64 {
    i64::from(font::GLYPH_HEIGHT * TEXT_SCALE)
}

/// Render the closing prices of `series` as a line chart
///
/// x is proportional to the date, y to the close. Grid lines are drawn at
/// every tick, with price labels on the left and date labels underneath.
pub fn render(series: &PriceSeries, config: &ChartConfig) -> RgbImage {
    let mut img = RgbImage::from_pixel(config.width, config.height, config.background);
    let area = PlotArea::new(config);
    let (low, high) = price_bounds(&series.closes());
    let scale = Scale {
        area,
        first: series.points().first().map_or(0, |p| p.date.timestamp()),
        last: series.latest().date.timestamp(),
        low,
        high,
    };

    // price grid and labels
    for i in 0..=PRICE_TICKS {
        let price = low + (high - low) * i as f64 / PRICE_TICKS as f64;
        let y = scale.y(price);
        draw_horizontal_line(&mut img, y, area.left, area.right, config.grid);

        let label = format!("{price:.2}");
        let x = area.left - 8 - text_width_px(&label);
        draw_text(&mut img, &label, x, y - text_height_px() / 2, TEXT_SCALE, config.ink);
    }

    // date grid and labels
    let date_ticks = if scale.first == scale.last { 0 } else { DATE_TICKS };
    for i in 0..=date_ticks {
        let timestamp = if date_ticks == 0 {
            scale.first
        } else {
            scale.first + (scale.last - scale.first) * i / date_ticks
        };
        let x = scale.x(timestamp);
        draw_vertical_line(&mut img, x, area.top, area.bottom, config.grid);

        let Some(date) = chrono::DateTime::from_timestamp(timestamp, 0) else {
            continue;
        };
        let label = date.format("%Y-%m-%d").to_string();
        let half = text_width_px(&label) / 2;
        let max_x = i64::from(config.width) - text_width_px(&label) - 2;
        let label_x = (x - half).clamp(2, max_x.max(2));
        draw_text(&mut img, &label, label_x, area.bottom + 10, TEXT_SCALE, config.ink);
    }

    // axes
    draw_horizontal_line(&mut img, area.top, area.left, area.right, config.ink);
    draw_horizontal_line(&mut img, area.bottom, area.left, area.right, config.ink);
    draw_vertical_line(&mut img, area.left, area.top, area.bottom, config.ink);
    draw_vertical_line(&mut img, area.right, area.top, area.bottom, config.ink);

    // price line, two pixels thick
    let pixels: Vec<(i64, i64)> = series
        .points()
        .iter()
        .filter(|p| p.close.is_finite())
        .map(|p| (scale.x(p.date.timestamp()), scale.y(p.close)))
        .collect();
    match pixels.as_slice() {
        [] => {}
        [(x, y)] => {
            for dx in -2..=2 {
                for dy in -2..=2 {
                    font::put(&mut img, x + dx, y + dy, config.line);
                }
            }
        }
        _ => {
            for pair in pixels.windows(2) {
                draw_line(&mut img, pair[0], pair[1], config.line);
                draw_line(
                    &mut img,
                    (pair[0].0, pair[0].1 + 1),
                    (pair[1].0, pair[1].1 + 1),
                    config.line,
                );
            }
        }
    }

    // title and axis labels
    let width = i64::from(config.width);
    let height = i64::from(config.height);
    let heading = title(series.symbol());
    draw_text(
        &mut img,
        &heading,
        (width - text_width_px(&heading)) / 2,
        16,
        TEXT_SCALE,
        config.ink,
    );
    draw_text(
        &mut img,
        "DATE",
        area.left + (area.width() - text_width_px("DATE")) / 2,
        height - 26,
        TEXT_SCALE,
        config.ink,
    );
    let y_label = "STOCK PRICE ($)";
    draw_text_vertical(
        &mut img,
        y_label,
        12,
        area.top + (area.height() + text_width_px(y_label)) / 2,
        TEXT_SCALE,
        config.ink,
    );

    img
}

/// Render `series` and write it to `path` as PNG, replacing any previous chart
pub fn save(series: &PriceSeries, path: &Path, config: &ChartConfig) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let img = render(series, config);
    img.save_with_format(path, ImageFormat::Png)?;
    debug!(symbol = series.symbol(), path = %path.display(), points = series.len(), "Chart written");

    Ok(path.to_path_buf())
}
