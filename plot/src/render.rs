use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut, Blend, Canvas,
};
use imageproc::point::Point;

use model::{Pt2D, ReferenceLine, Trajectory};

use crate::report::{Analysis, LineRole};
use crate::scenario::{Background, ReferenceLines, Scenario, GRAY};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 128, 0];
const MARKER_RADIUS: i32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coloring {
    ByCategory,
    /// Through the Tableau 10 palette, in the order trajectories are drawn
    Cycle,
}

/// Maps world coordinates onto output pixels
pub struct Frame {
    width: u32,
    height: u32,
    // (left, right)
    x_limits: (f64, f64),
    // (bottom, top)
    y_limits: (f64, f64),
}

impl Frame {
    pub fn new(width: u32, height: u32, x_limits: (f64, f64), y_limits: (f64, f64)) -> Self {
        Self {
            width,
            height,
            x_limits,
            y_limits,
        }
    }

    pub fn to_pixel(&self, pt: Pt2D) -> (f32, f32) {
        let (left, right) = self.x_limits;
        let (bottom, top) = self.y_limits;
        let x = (pt.x() - left) / (right - left) * self.width as f64;
        let y = (pt.y() - top) / (bottom - top) * self.height as f64;
        (x as f32, y as f32)
    }

    /// The world position at the center of a pixel
    pub fn to_world(&self, col: u32, row: u32) -> Pt2D {
        let (left, right) = self.x_limits;
        let (bottom, top) = self.y_limits;
        let x = left + (col as f64 + 0.5) / self.width as f64 * (right - left);
        let y = top + (row as f64 + 0.5) / self.height as f64 * (bottom - top);
        Pt2D::new(x, y)
    }
}

pub fn load_background(bg: &Background) -> Result<RgbaImage> {
    let img = image::open(&bg.path).with_context(|| format!("loading background {}", bg.path))?;
    Ok(img.to_rgba8())
}

pub fn render(
    scenario: &Scenario,
    trajectories: &[&Trajectory],
    analysis: &Analysis,
    coloring: Coloring,
    background: Option<&RgbaImage>,
) -> RgbaImage {
    let (x_limits, y_limits) = scenario.view(trajectories);
    let frame = Frame::new(scenario.width, scenario.height, x_limits, y_limits);

    let mut base = RgbaImage::from_pixel(scenario.width, scenario.height, WHITE);
    if let (Some(img), Some(bg)) = (background, scenario.background.as_ref()) {
        paint_background(&mut base, &frame, bg, img);
    }
    let mut canvas = Blend(base);

    // Reference lines go underneath the trajectories
    match scenario.lines {
        ReferenceLines::None => {}
        ReferenceLines::Single { ref line } => {
            draw_reference_line(&mut canvas, &frame, line, 2.0, RED);
        }
        ReferenceLines::ArrivalDeparture {
            ref arrival,
            ref departure,
        } => {
            draw_reference_line(&mut canvas, &frame, arrival, 4.0, RED);
            draw_reference_line(&mut canvas, &frame, departure, 4.0, GREEN);
        }
    }

    for (idx, trajectory) in trajectories.iter().enumerate() {
        let color = if analysis.is_wrong_way(trajectory.id()) {
            RED
        } else {
            match coloring {
                Coloring::ByCategory => scenario.color_for(trajectory.category()).unwrap_or(GRAY),
                Coloring::Cycle => {
                    let c = colorous::TABLEAU10[idx % colorous::TABLEAU10.len()];
                    [c.r, c.g, c.b]
                }
            }
        };
        draw_path(
            &mut canvas,
            &frame,
            &trajectory.positions(),
            scenario.linewidth,
            rgba(color, scenario.alpha),
        );
    }

    for t in analysis.trajectories.values() {
        for crossing in &t.crossings {
            if let Some(pt) = crossing.event.intersection {
                let color = match crossing.role {
                    LineRole::Reference | LineRole::Arrival => RED,
                    LineRole::Departure => GREEN,
                };
                let (x, y) = frame.to_pixel(pt);
                draw_hollow_circle_mut(
                    &mut canvas,
                    (x.round() as i32, y.round() as i32),
                    MARKER_RADIUS,
                    rgba(color, 1.0),
                );
            }
        }
    }

    canvas.0
}

pub fn save(img: &RgbaImage, path: &str) -> Result<()> {
    img.save(path).with_context(|| format!("saving {path}"))?;
    info!("Wrote {}x{} plot to {}", img.width(), img.height(), path);
    Ok(())
}

// Nearest-neighbor sampling of the background through its extent
fn paint_background(canvas: &mut RgbaImage, frame: &Frame, bg: &Background, img: &RgbaImage) {
    let (img_width, img_height) = (img.width() as f64, img.height() as f64);
    for (col, row, pixel) in canvas.enumerate_pixels_mut() {
        let pt = frame.to_world(col, row);
        let u = (pt.x() - bg.min_x) / (bg.max_x - bg.min_x) * img_width;
        let v = (pt.y() - bg.min_y) / (bg.max_y - bg.min_y) * img_height;
        if u >= 0.0 && v >= 0.0 && u < img_width && v < img_height {
            *pixel = *img.get_pixel(u as u32, v as u32);
        }
    }
}

fn draw_reference_line<C: Canvas<Pixel = Rgba<u8>>>(
    canvas: &mut C,
    frame: &Frame,
    line: &ReferenceLine,
    width: f32,
    color: [u8; 3],
) {
    draw_path(
        canvas,
        frame,
        &[line.pt1(), line.pt2()],
        width,
        rgba(color, 1.0),
    );
}

fn draw_path<C: Canvas<Pixel = Rgba<u8>>>(
    canvas: &mut C,
    frame: &Frame,
    pts: &[Pt2D],
    width: f32,
    color: Rgba<u8>,
) {
    for pair in pts.windows(2) {
        draw_thick_segment(
            canvas,
            frame.to_pixel(pair[0]),
            frame.to_pixel(pair[1]),
            width,
            color,
        );
    }
}

fn draw_thick_segment<C: Canvas<Pixel = Rgba<u8>>>(
    canvas: &mut C,
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if width <= 1.0 || length == 0.0 {
        draw_line_segment_mut(canvas, from, to, color);
        return;
    }

    // Offset both ends perpendicular to the segment
    let (nx, ny) = (-dy / length * width / 2.0, dx / length * width / 2.0);
    let corner = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let poly = [
        corner(from.0 + nx, from.1 + ny),
        corner(to.0 + nx, to.1 + ny),
        corner(to.0 - nx, to.1 - ny),
        corner(from.0 - nx, from.1 - ny),
    ];
    if poly[0] == poly[3] {
        draw_line_segment_mut(canvas, from, to, color);
    } else {
        draw_polygon_mut(canvas, &poly, color);
    }
}

fn rgba(color: [u8; 3], alpha: f32) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], (alpha * 255.0).round() as u8])
}
