//! Extended element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` lays content out as a vertical flow.  The report additionally needs
//! underlined headings of a fixed height and chart images pinned to page
//! coordinates, which this module provides.

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};
use image::GenericImageView;
use log::warn;

use crate::layout::PageGeometry;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.4;
// Keeps scaled images from exceeding the body width through rounding.
const WIDTH_TOLERANCE_MM: f64 = 0.01;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Natural size of `image` when printed at `dpi`, in millimetres.
pub fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> (f64, f64) {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    (width_mm, height_mm)
}

fn default_underline_offset() -> Mm {
    mm_from_f64(DEFAULT_UNDERLINE_OFFSET_MM)
}

/// A single line of text with an underline stroke, optionally occupying a fixed height.
///
/// Used for the page header and for section titles, which are both printed bold
/// and underlined.
pub struct UnderlinedText {
    text: StyledString,
    alignment: Alignment,
    underline_offset: Mm,
    height: Option<Mm>,
}

impl UnderlinedText {
    /// Creates a new underlined text element.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: StyledString::new(text.into(), style),
            alignment: Alignment::Left,
            underline_offset: default_underline_offset(),
            height: None,
        }
    }

    /// Sets the alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Makes the element occupy exactly `height`, unless the line itself is taller.
    pub fn with_height(mut self, height: impl Into<Mm>) -> Self {
        self.height = Some(height.into());
        self
    }
}

impl Element for UnderlinedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut string = self.text.clone();
        string.style = style.and(string.style);
        let width = string.width(&context.font_cache);
        let line_height = string.style.line_height(&context.font_cache);
        let glyph_height = string
            .style
            .font(&context.font_cache)
            .glyph_height(string.style.font_size());
        let height = self.height.map_or(line_height, |h| h.max(line_height));

        let mut result = RenderResult::default();
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let available_width = area.size().width;
        let x_offset = match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available_width - width) / 2.0,
            Alignment::Right => available_width - width,
        };

        if let Some(mut section) =
            area.text_section(&context.font_cache, Position::new(x_offset, 0), style)
        {
            section.print_str(&string.s, string.style)?;
        } else {
            result.has_more = true;
            return Ok(result);
        }

        let baseline = glyph_height + self.underline_offset;
        let mut line_style = Style::new();
        if let Some(color) = string.style.color() {
            line_style = line_style.with_color(color);
        }
        area.draw_line(
            vec![
                Position::new(x_offset, baseline),
                Position::new(x_offset + width, baseline),
            ],
            line_style,
        );

        result.size = Size::new(available_width, height);
        Ok(result)
    }
}

struct PinnedImage {
    image: Image,
    x: f64,
    y: f64,
    height: f64,
}

fn fit_offset(
    geometry: &PageGeometry,
    origin_y: f64,
    pinned: &PinnedImage,
    available: f64,
) -> Option<(f64, f64)> {
    let (dx, dy) = geometry.to_area(pinned.x, pinned.y, origin_y);
    (dy + pinned.height <= available).then_some((dx, dy))
}

/// Images pinned to page coordinates on a single page.
///
/// Coordinates are page coordinates in millimetres; `origin_y` is the page
/// coordinate of the top edge of the area this element receives.  Images that
/// would extend past the bottom of the area are skipped with a warning, they
/// are never moved to another page.
pub struct PinnedImages {
    images: Vec<PinnedImage>,
    origin_y: f64,
    geometry: PageGeometry,
}

impl PinnedImages {
    /// Creates an empty set of pinned images for an area starting at `origin_y`.
    pub fn new(geometry: PageGeometry, origin_y: f64) -> Self {
        Self {
            images: Vec::new(),
            origin_y,
            geometry,
        }
    }

    /// Number of images on this page.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if no image was added.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Area offsets of the images that fit into an area `available` millimetres tall.
    ///
    /// Entries are `None` for images that would extend past the bottom of the area.
    pub fn offsets(&self, available: f64) -> Vec<Option<(f64, f64)>> {
        self.images
            .iter()
            .map(|pinned| fit_offset(&self.geometry, self.origin_y, pinned, available))
            .collect()
    }

    /// Pins `image` with its top-left corner at `(x, y)`, scaled to `width` millimetres.
    ///
    /// The width is capped so the image never extends past the right margin.
    pub fn push(
        &mut self,
        image: image::DynamicImage,
        x: f64,
        y: f64,
        width: f64,
    ) -> Result<(), Error> {
        let (natural_width, natural_height) = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
        let max_width = self.geometry.body_width() - (x - self.geometry.margin).max(0.0);
        let width = width.min(max_width) - WIDTH_TOLERANCE_MM;
        let scale = if natural_width > f64::EPSILON {
            width / natural_width
        } else {
            1.0
        };

        let mut image = Image::from_dynamic_image(image)?;
        image.set_scale(Scale::new(scale, scale));
        self.images.push(PinnedImage {
            image,
            x,
            y,
            height: natural_height * scale,
        });
        Ok(())
    }
}

impl Element for PinnedImages {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let available = mm_to_f64(area.size().height);
        let mut bottom: f64 = 0.0;

        for pinned in &mut self.images {
            let Some((dx, dy)) = fit_offset(&self.geometry, self.origin_y, pinned, available)
            else {
                warn!(
                    "chart image at y = {:.1} mm does not fit on the page and is skipped",
                    pinned.y
                );
                continue;
            };

            let mut slot = area.clone();
            slot.add_offset(Position::new(mm_from_f64(dx), mm_from_f64(dy)));
            let rendered = pinned.image.render(context, slot, style)?;
            if rendered.has_more {
                warn!("chart image at y = {:.1} mm was not rendered", pinned.y);
                continue;
            }
            bottom = bottom.max(dy + mm_to_f64(rendered.size.height));
        }

        let mut result = RenderResult::default();
        result.size = Size::new(area.size().width, mm_from_f64(bottom.min(available)));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::{estimated_image_size, mm_from_f64, mm_to_f64};
    use image::{DynamicImage, ImageBuffer, Rgb};

    #[test]
    fn millimetre_conversions_round_trip() {
        assert_eq!(mm_to_f64(mm_from_f64(12.5)), 12.5);
    }

    #[test]
    fn chart_row_prints_at_expected_aspect() {
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(1200, 500);
        let image = DynamicImage::ImageRgb8(buffer);
        let (width, height) = estimated_image_size(&image, 300.0);
        assert!((width - 101.6).abs() < 1e-9);
        assert!((height / width - 500.0 / 1200.0).abs() < 1e-9);
    }
}
