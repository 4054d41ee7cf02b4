use std::cmp::Ordering;

/// One contiguous piece of text extracted from a page.
///
/// Coordinates are in PDF user space with the origin at the bottom-left.
/// The text is trimmed and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub font_name: String,
    /// Page rotation in degrees, copied from the owning page
    pub rotation: i64,
    pub page_width: f32,
    pub page_height: f32,
}

impl TextRun {
    /// Build a run, or `None` when the text is blank.
    pub fn new(
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        font_name: impl Into<String>,
        geometry: PageGeometry,
    ) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            x,
            y,
            font_size,
            font_name: font_name.into(),
            rotation: geometry.rotation,
            page_width: geometry.width,
            page_height: geometry.height,
        })
    }
}

/// Width, height and rotation of a page's visible area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Degrees clockwise; one of 0, 90, 180, 270
    pub rotation: i64,
}

impl Default for PageGeometry {
    /// US Letter, unrotated
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            rotation: 0,
        }
    }
}

/// The extracted text of one page.
///
/// Runs are ordered top-to-bottom, then left-to-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number in the source document
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    pub rotation: i64,
    pub runs: Vec<TextRun>,
}

impl Page {
    /// Build a page from its runs, sorting them into reading order.
    ///
    /// Returns `None` for a page without runs: such pages are left out of
    /// the document entirely rather than kept as empty pages.
    pub fn new(page_number: u32, geometry: PageGeometry, mut runs: Vec<TextRun>) -> Option<Self> {
        if runs.is_empty() {
            return None;
        }

        runs.sort_by(reading_order);

        Some(Self {
            page_number,
            width: geometry.width,
            height: geometry.height,
            rotation: geometry.rotation,
            runs,
        })
    }
}

/// Descending `y`, then ascending `x`.
pub(crate) fn reading_order(a: &TextRun, b: &TextRun) -> Ordering {
    b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x))
}

/// Total number of runs across all pages.
pub fn total_runs(pages: &[Page]) -> usize {
    pages.iter().map(|p| p.runs.len()).sum()
}
