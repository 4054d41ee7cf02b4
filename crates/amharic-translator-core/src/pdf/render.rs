//! Layout-preserving output.
//!
//! Each translated run is drawn as its own text object at the position the
//! original run had, one output page per input page. Runs that would land
//! on top of the previously placed line are pushed down.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, error, info, warn};

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::mapper::TranslationMap;
use super::font::{FontChain, RenderFont};
use super::model::{Page, TextRun};

/// Font resource name used in every content stream
const FONT_RESOURCE: &str = "F1";

const INFO_TITLE: &str = "Translated Document";
const INFO_PRODUCER: &str = "English to Amharic Translator";
const INFO_AUTHOR: &str = "Amharic Translator";

/// What happened while rendering, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub pages_rendered: usize,
    pub pages_skipped: usize,
    pub runs_drawn: usize,
    /// Runs that failed to encode
    pub runs_skipped: usize,
    /// Runs whose translation was empty
    pub runs_empty: usize,
}

/// Serialized PDF plus report. Empty `bytes` means nothing could be rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

impl RenderOutput {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Render translated pages with the first usable font of the configured chain.
pub fn render_document(
    pages: &[Page],
    map: &TranslationMap,
    layout: &LayoutConfig,
) -> RenderOutput {
    let font = FontChain::from_layout(layout).resolve();
    render_with_font(pages, map, layout, font)
}

/// Render translated pages with a given font.
///
/// Never fails outright: problems with single runs or pages are logged and
/// skipped, and a document with nothing left to render gives empty bytes.
pub fn render_with_font(
    pages: &[Page],
    map: &TranslationMap,
    layout: &LayoutConfig,
    mut font: RenderFont,
) -> RenderOutput {
    let mut report = RenderReport::default();

    let Some(first) = pages.first() else {
        warn!("No pages to render");
        return RenderOutput::default();
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.new_object_id();
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let spacing = layout.min_line_spacing_pt();
    let mut kids = Vec::with_capacity(pages.len());

    for page in pages {
        let target = PageTarget {
            pages_id,
            resources_id,
            font_scale: layout.font_scale,
            spacing,
        };
        match render_page(&mut doc, target, page, map, &mut font, &mut report) {
            Ok(page_id) => {
                report.pages_rendered += 1;
                kids.push(Object::Reference(page_id));
            }
            Err(e) => {
                warn!("Skipping page {}: {}", page.page_number, e);
                report.pages_skipped += 1;
            }
        }
    }

    if kids.is_empty() {
        warn!("No page could be rendered");
        return RenderOutput { bytes: Vec::new(), report };
    }

    if let Err(e) = font.embed(&mut doc, font_id) {
        error!("Failed to embed font {}: {}", font.base_name(), e);
        return RenderOutput { bytes: Vec::new(), report };
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(kids),
            "Count" => count,
            "MediaBox" => media_box(first),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(INFO_TITLE),
        "Producer" => Object::string_literal(INFO_PRODUCER),
        "Author" => Object::string_literal(INFO_AUTHOR),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    if let Err(e) = doc.save_to(&mut bytes) {
        error!("Failed to serialize PDF: {}", e);
        return RenderOutput { bytes: Vec::new(), report };
    }

    info!(
        "Rendered {} pages ({} runs drawn, {} skipped, {} empty) with {}",
        report.pages_rendered,
        report.runs_drawn,
        report.runs_skipped,
        report.runs_empty,
        font.base_name()
    );
    RenderOutput { bytes, report }
}

/// Where a rendered page is attached, and its layout parameters.
#[derive(Debug, Clone, Copy)]
struct PageTarget {
    pages_id: ObjectId,
    resources_id: ObjectId,
    font_scale: f32,
    spacing: f32,
}

/// Vertical placement of runs on one page.
#[derive(Debug, Clone, Copy)]
struct Placement {
    last_y: Option<f32>,
    spacing: f32,
}

impl Placement {
    const fn new(spacing: f32) -> Self {
        Self {
            last_y: None,
            spacing,
        }
    }

    /// Where a run at `y` drawn at `font_size` goes.
    fn position(&self, y: f32, font_size: f32) -> f32 {
        match self.last_y {
            Some(last) if (y - last).abs() < self.spacing => last - font_size - self.spacing,
            _ => y,
        }
    }

    const fn commit(&mut self, y: f32) {
        self.last_y = Some(y);
    }
}

fn render_page(
    doc: &mut Document,
    target: PageTarget,
    page: &Page,
    map: &TranslationMap,
    font: &mut RenderFont,
    report: &mut RenderReport,
) -> Result<ObjectId> {
    if !(page.width > 0.0 && page.height > 0.0) {
        return Err(Error::RenderFailed(format!(
            "invalid page size {}x{}",
            page.width, page.height
        )));
    }

    let mut runs: Vec<&TextRun> = page.runs.iter().collect();
    runs.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut placement = Placement::new(target.spacing);
    let mut operations = Vec::with_capacity(runs.len() * 5);

    for run in runs {
        let text = map.resolve(&run.text);
        if text.is_empty() {
            report.runs_empty += 1;
            continue;
        }

        let font_size = run.font_size * target.font_scale;
        let y = placement.position(run.y, font_size);

        let encoded = match font.encode(text) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Skipping run {:?} on page {}: {}", run.text, page.page_number, e);
                report.runs_skipped += 1;
                continue;
            }
        };

        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_RESOURCE.into()), Object::Real(font_size)]),
            Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    Object::Real(run.x),
                    Object::Real(y),
                ],
            ),
            Operation::new("Tj", vec![encoded]),
            Operation::new("ET", vec![]),
        ]);
        placement.commit(y);
        report.runs_drawn += 1;
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| Error::Lopdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => target.pages_id,
        "MediaBox" => media_box(page),
        "Contents" => content_id,
        "Resources" => target.resources_id,
    };
    if page.rotation != 0 {
        page_dict.set("Rotate", page.rotation);
    }

    debug!("Rendered page {} ({} runs)", page.page_number, page.runs.len());
    Ok(doc.add_object(page_dict))
}

fn media_box(page: &Page) -> Object {
    Object::Array(vec![
        0.into(),
        0.into(),
        Object::Real(page.width),
        Object::Real(page.height),
    ])
}
