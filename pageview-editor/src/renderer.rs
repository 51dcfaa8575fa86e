use anyhow::{Context, Result};
use pdfium_render::prelude::*;

/// Process-wide pdfium binding.
///
/// Documents borrow the binding for their whole life, so it is leaked once at
/// startup and handed out as `&'static`.
#[derive(Clone, Copy)]
pub struct PdfRenderer {
    pdfium: &'static Pdfium,
}

impl PdfRenderer {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?;
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
        Ok(Self { pdfium })
    }

    pub fn load_document(&self, bytes: Vec<u8>) -> Result<Document> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .context("Failed to load PDF document")?;
        Ok(Document { inner: document })
    }
}

pub struct Document {
    inner: PdfDocument<'static>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count())
            .finish()
    }
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.inner.pages().len() as usize
    }

    /// Page sizes in points, in document order.
    pub fn page_sizes(&self) -> Vec<(f32, f32)> {
        self.inner
            .pages()
            .iter()
            .map(|page| (page.width().value, page.height().value))
            .collect()
    }

    pub fn render_page(&self, page_index: usize, zoom: f32) -> Result<image::RgbaImage> {
        let page = self
            .inner
            .pages()
            .get(page_index as u16)
            .context("Page index out of bounds")?;

        let render_width = (page.width().value * zoom) as i32;
        let render_height = (page.height().value * zoom) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(render_width.max(1))
            .set_maximum_height(render_height.max(1))
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&render_config)
            .context("Failed to render page")?;

        let buffer = bitmap.as_raw_bytes();
        let img = image::RgbaImage::from_raw(bitmap.width() as u32, bitmap.height() as u32, buffer.to_vec())
            .context("Failed to create image from bitmap")?;

        Ok(img)
    }
}
