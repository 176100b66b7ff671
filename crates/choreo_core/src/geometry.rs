//! Document-space geometry primitives
//!
//! All quantities are `f32` in document coordinates: the origin is the
//! top-left corner of the document, with `top` growing downward along the
//! scroll axis.

/// Cumulative offset of an element from the document origin.
///
/// Hosts compensate for scrolled ancestor containers along the
/// offset-parent chain, so two elements with equal `top` line up on screen
/// regardless of nesting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub top: f32,
    pub left: f32,
}

impl Offset {
    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }
}

/// Rendered size of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An element's bounding box in document space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl ElementBox {
    /// Assemble a box from a document offset and a rendered size.
    pub fn from_parts(offset: Offset, size: Size) -> Self {
        Self {
            top: offset.top,
            bottom: offset.top + size.height,
            left: offset.left,
            right: offset.left + size.width,
        }
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}
