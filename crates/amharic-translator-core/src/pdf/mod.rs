mod extract;
pub mod font;
mod geometry;
mod model;
mod render;

pub use extract::{TextExtractor, extract_pages, extract_pages_from_file};
pub use font::{FontChain, FontSource, RenderFont};
pub use geometry::{normalize_rotation, page_geometry};
pub use model::{Page, PageGeometry, TextRun, total_runs};
pub use render::{RenderOutput, RenderReport, render_document, render_with_font};
