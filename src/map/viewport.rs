use glam::{DMat3, DVec2};
use thiserror::Error;

use crate::map::orientation::Orientation;

/// Reasons [`Viewport::try_new`] rejects its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewportError {
    #[error("viewport width must be positive")]
    ZeroWidth,
    #[error("viewport height must be positive")]
    ZeroHeight,
    #[error("projection radius must be positive")]
    ZeroRadius,
}

/// Integer screen rectangle, `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x as f64
            && p.x < self.x as f64 + self.width as f64
            && p.y >= self.y as f64
            && p.y < self.y as f64 + self.height as f64
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Per-frame view parameters: screen size in pixels, globe radius in
/// pixels and the globe orientation. Every projection call borrows one.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    radius: u32,
    orientation: Orientation,
    /// World-to-view rotation, cached for the forward transform.
    view_matrix: DMat3,
}

impl Viewport {
    /// Build without validation. Zero sizes are tolerated: nothing projects
    /// as visible and nothing unprojects.
    pub fn new(width: u32, height: u32, radius: u32, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            radius,
            orientation,
            view_matrix: orientation.inverse().to_matrix(),
        }
    }

    pub fn try_new(
        width: u32,
        height: u32,
        radius: u32,
        orientation: Orientation,
    ) -> Result<Self, ViewportError> {
        if width == 0 {
            return Err(ViewportError::ZeroWidth);
        }
        if height == 0 {
            return Err(ViewportError::ZeroHeight);
        }
        if radius == 0 {
            return Err(ViewportError::ZeroRadius);
        }
        Ok(Self::new(width, height, radius, orientation))
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline(always)]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline(always)]
    pub fn view_matrix(&self) -> &DMat3 {
        &self.view_matrix
    }

    /// Screen center in pixels.
    #[inline(always)]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// `width² + height²`, widened so it cannot overflow.
    pub fn squared_diagonal_reach(&self) -> u128 {
        let w = self.width as u128;
        let h = self.height as u128;
        w * w + h * h
    }

    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }

    /// True if the pixel lies inside `[0, width) × [0, height)`.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        self.screen_rect().contains(p)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius;
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.view_matrix = orientation.inverse().to_matrix();
    }
}
