use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};

use crate::canvas::PixelSource;
use crate::ink::Ink;

/// Space kept around the ink when cropping, in surface units.
pub const SNAPSHOT_MARGIN: f64 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot as PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Axis-aligned box in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// The tightest box around every point of `ink`, or `None` if nothing was drawn.
    pub fn of_ink(ink: &Ink) -> Option<Self> {
        ink.points().fold(None, |acc: Option<Self>, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Grows the box by `margin` on every side without leaving `[0, width] x [0, height]`.
    pub fn expand_within(self, margin: f64, width: u32, height: u32) -> Self {
        Self {
            min_x: (self.min_x - margin).max(0.0),
            min_y: (self.min_y - margin).max(0.0),
            max_x: (self.max_x + margin).min(width as f64),
            max_y: (self.max_y + margin).min(height as f64),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Whole-pixel area of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Snaps a box outwards onto the pixel grid. Degenerate boxes have no region.
    pub fn covering(bounds: &BoundingBox) -> Option<Self> {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return None;
        }
        let x = bounds.min_x.floor() as u32;
        let y = bounds.min_y.floor() as u32;
        let right = bounds.max_x.ceil() as u32;
        let bottom = bounds.max_y.ceil() as u32;
        Some(Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
        })
    }
}

/// The area of a `width` x `height` surface that a snapshot of `ink` would cover.
pub fn snapshot_bounds(ink: &Ink, width: u32, height: u32) -> Option<BoundingBox> {
    let bounds = BoundingBox::of_ink(ink)?.expand_within(SNAPSHOT_MARGIN, width, height);
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }
    Some(bounds)
}

/// A cropped picture of the user's answer, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub data_uri: String,
}

/// Copies the inked part of `surface` into a standalone PNG.
///
/// Returns `Ok(None)` when there is nothing to show. The pixels are copied
/// from the surface as they are, strokes are not redrawn.
pub fn extract<S: PixelSource>(ink: &Ink, surface: &S) -> Result<Option<Snapshot>, SnapshotError> {
    let (width, height) = surface.dimensions();
    let Some(region) = snapshot_bounds(ink, width, height).and_then(|b| Region::covering(&b)) else {
        return Ok(None);
    };
    let image = surface.copy_region(&region);
    let data_uri = encode_png_data_uri(&image)?;
    Ok(Some(Snapshot {
        width: region.width,
        height: region.height,
        data_uri,
    }))
}

pub fn encode_png_data_uri(image: &RgbaImage) -> Result<String, SnapshotError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
