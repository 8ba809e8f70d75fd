use fieldscope_core::Point;
use image::RgbaImage;

/// Maps pointer coordinates from the displayed canvas rectangle into
/// the image's native pixel space.
///
/// The on-screen canvas may be laid out at any size, so every pointer
/// coordinate has to go through `scale = native / displayed` per axis
/// before being recorded, or strokes drift from the cursor whenever the
/// canvas is not shown 1:1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    native_w: f32,
    native_h: f32,
    display_w: f32,
    display_h: f32,
}

impl Viewport {
    pub fn new(native_w: u32, native_h: u32, display_w: f32, display_h: f32) -> Self {
        // A degenerate display rectangle would blow up the scale factor.
        let display_w = if display_w > 0.0 {
            display_w
        } else {
            native_w as f32
        };
        let display_h = if display_h > 0.0 {
            display_h
        } else {
            native_h as f32
        };
        Self {
            native_w: native_w as f32,
            native_h: native_h as f32,
            display_w,
            display_h,
        }
    }

    pub fn for_image(image: &RgbaImage, display_w: f32, display_h: f32) -> Self {
        Self::new(image.width(), image.height(), display_w, display_h)
    }

    /// Canvas shown at its native resolution.
    pub fn one_to_one(image: &RgbaImage) -> Self {
        Self::new(
            image.width(),
            image.height(),
            image.width() as f32,
            image.height() as f32,
        )
    }

    fn scale_x(&self) -> f32 {
        self.native_w / self.display_w
    }

    fn scale_y(&self) -> f32 {
        self.native_h / self.display_h
    }

    /// Inverse-map a pointer position on the displayed canvas into
    /// image-pixel coordinates.
    pub fn to_image(&self, pointer: Point) -> Point {
        Point::new(pointer.x * self.scale_x(), pointer.y * self.scale_y())
    }
}
