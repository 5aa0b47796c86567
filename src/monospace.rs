//! Built-in fixed-metrics collaborators
//!
//! `MonospaceShaper` measures text with a fixed advance and line height;
//! `BlockRenderer` paints each row as a filled band. Together they let a
//! host run the reader headless (tests, benches, terminal-style output)
//! without a real text-rendering engine.

use async_trait::async_trait;
use image::Rgba;

use crate::error::RenderError;
use crate::traits::{PageContent, PageRenderer, RowMeasure, TextShaper};
use crate::types::{PageImage, RowRect, Viewport};

/// Fixed-advance glyph metrics
#[derive(Debug, Clone, Copy)]
pub struct MonospaceShaper {
    advance: f32,
    line_height: f32,
}

impl MonospaceShaper {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance: advance.max(f32::EPSILON),
            line_height: line_height.max(f32::EPSILON),
        }
    }
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl TextShaper for MonospaceShaper {
    fn measure(&self, span: &str, max_width: f32) -> RowMeasure {
        let budget = (max_width / self.advance).floor().max(0.0) as usize;
        let mut fit = span.len();
        let mut count = 0usize;

        for (chars, (index, _)) in span.char_indices().enumerate() {
            if chars == budget {
                fit = index;
                break;
            }
            count += 1;
        }

        RowMeasure {
            fit,
            width: count as f32 * self.advance,
            height: self.line_height,
        }
    }
}

/// Paints each row as a filled band into a viewport-sized bitmap
///
/// Not a glyph rasterizer; it only makes the page geometry visible.
#[derive(Debug, Clone, Copy)]
pub struct BlockRenderer {
    background: Rgba<u8>,
    ink: Rgba<u8>,
}

impl BlockRenderer {
    pub fn new(background: Rgba<u8>, ink: Rgba<u8>) -> Self {
        Self { background, ink }
    }
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self::new(Rgba([255, 255, 255, 255]), Rgba([64, 64, 64, 255]))
    }
}

#[async_trait]
impl PageRenderer for BlockRenderer {
    async fn rasterize(
        &self,
        page: PageContent<'_>,
        viewport: Viewport,
    ) -> Result<PageImage, RenderError> {
        let rows: Vec<RowRect> = page.rows.to_vec();
        let (width, height) = viewport.pixel_size();
        let background = self.background;
        let ink = self.ink;

        tokio::task::spawn_blocking(move || {
            let mut img = PageImage::from_pixel(width, height, background);
            for row in &rows {
                paint_band(&mut img, row, ink);
            }
            Ok(img)
        })
        .await
        .map_err(|e| RenderError::Failed(format!("Task join error: {}", e)))?
    }
}

fn paint_band(img: &mut PageImage, row: &RowRect, ink: Rgba<u8>) {
    let x0 = row.x.max(0.0) as u32;
    let y0 = row.y.max(0.0) as u32;
    let x1 = ((row.x + row.width).ceil() as u32).min(img.width());
    let y1 = ((row.y + row.height).ceil() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, ink);
        }
    }
}
