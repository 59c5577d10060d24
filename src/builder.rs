//! Assembles the `genpdf` document the report is rendered into.

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Context, Document, Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};

use crate::elements::{mm_from_f64, mm_to_f64};
use crate::layout::PageGeometry;

type Decoration = Box<dyn Fn(usize) -> Box<dyn Element>>;

/// Creates documents whose pages follow a [`PageGeometry`].
///
/// The header and footer are drawn into bands of exactly the geometry's header
/// and footer height, so the body of every page starts at
/// [`PageGeometry::body_top`] no matter what the decorations contain.
pub struct DocumentBuilder {
    font_family: FontFamily<FontData>,
    paper_size: Size,
    geometry: PageGeometry,
    header: Option<Decoration>,
    footer: Option<Decoration>,
}

impl DocumentBuilder {
    /// Starts an A4 document using `font_family` and the default page geometry.
    pub fn new(font_family: FontFamily<FontData>) -> Self {
        Self {
            font_family,
            paper_size: PaperSize::A4.into(),
            geometry: PageGeometry::default(),
            header: None,
            footer: None,
        }
    }

    /// Replaces the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sets the element drawn in the header band; it receives the 1-based page number.
    pub fn with_header<F, E>(mut self, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.header = Some(boxed_decoration(header));
        self
    }

    /// Sets the element drawn in the footer band; it receives the 1-based page number.
    pub fn with_footer<F, E>(mut self, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(boxed_decoration(footer));
        self
    }

    /// Creates the document with the configured paper size and page decorations.
    pub fn build(self) -> Document {
        let mut document = Document::new(self.font_family);
        document.set_paper_size(self.paper_size);
        document.set_page_decorator(GeometryDecorator {
            page: 0,
            geometry: self.geometry,
            header: self.header,
            footer: self.footer,
        });
        document
    }
}

fn boxed_decoration<F, E>(factory: F) -> Decoration
where
    F: Fn(usize) -> E + 'static,
    E: Element + 'static,
{
    Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>)
}

struct GeometryDecorator {
    page: usize,
    geometry: PageGeometry,
    header: Option<Decoration>,
    footer: Option<Decoration>,
}

fn draw_band(
    decoration: &Decoration,
    page: usize,
    context: &Context,
    mut band: Area<'_>,
    height: Mm,
    style: Style,
    what: &str,
) -> Result<(), Error> {
    band.set_height(height);
    let result = decoration(page).render(context, band, style)?;
    if result.has_more {
        return Err(Error::new(
            format!("{what} does not fit into its {:.1} mm band", mm_to_f64(height)),
            ErrorKind::PageSizeExceeded,
        ));
    }
    Ok(())
}

impl PageDecorator for GeometryDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: Style,
    ) -> Result<Area<'a>, Error> {
        self.page += 1;

        let margin = mm_from_f64(self.geometry.margin);
        area.add_margins(Margins::trbl(margin, margin, margin, margin));

        let header_height = mm_from_f64(self.geometry.header_height);
        let footer_height = mm_from_f64(self.geometry.footer_height);
        if header_height + footer_height > area.size().height {
            return Err(Error::new(
                "Header and footer bands leave no room for the page body",
                ErrorKind::InvalidData,
            ));
        }

        if let Some(header) = &self.header {
            draw_band(header, self.page, context, area.clone(), header_height, style, "Header")?;
        }
        area.add_offset(Position::new(0, header_height));

        let body_height = area.size().height - footer_height;
        if let Some(footer) = &self.footer {
            let mut band = area.clone();
            band.add_offset(Position::new(0, body_height));
            draw_band(footer, self.page, context, band, footer_height, style, "Footer")?;
        }
        area.set_height(body_height);

        Ok(area)
    }
}
