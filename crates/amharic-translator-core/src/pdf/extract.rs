//! Positioned text extraction.
//!
//! Walks each page's content stream with lopdf, tracking just enough text
//! state (text matrix, line matrix, leading, font) to place every text-showing
//! operator. The run position is the translation part of the text matrix at
//! the moment the operator is executed.
//!
//! Form XObjects invoked with `Do` are walked in place, with their own font
//! resources layered over the page's.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, LayoutConfig};
use crate::error::Result;
use super::geometry::{number, page_geometry};
use super::model::{Page, PageGeometry, TextRun};

/// `TJ` adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Form XObjects nested deeper than this are not entered
const MAX_FORM_DEPTH: usize = 8;

/// Extract every page with at least one text run.
///
/// Bytes that do not parse as a PDF give an empty list, the same as a PDF
/// without extractable text.
pub fn extract_pages(bytes: &[u8]) -> Vec<Page> {
    TextExtractor::default().extract(bytes)
}

/// Read a file and extract its pages.
pub fn extract_pages_from_file(path: impl AsRef<Path>) -> Result<Vec<Page>> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(extract_pages(&bytes))
}

/// Text extraction from PDF documents
#[derive(Debug, Clone)]
pub struct TextExtractor {
    /// Size used until a `Tf` operator sets one
    pub default_font_size: f32,
    /// Name used when a font resource has no `BaseFont`
    pub fallback_font_name: String,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            fallback_font_name: DEFAULT_FONT_NAME.to_string(),
        }
    }
}

impl TextExtractor {
    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self {
            default_font_size: layout.default_font_size,
            fallback_font_name: layout.fallback_font_name.clone(),
        }
    }

    /// Parse PDF bytes and extract all non-empty pages in document order.
    pub fn extract(&self, bytes: &[u8]) -> Vec<Page> {
        match Document::load_mem(bytes) {
            Ok(doc) => self.extract_document(&doc),
            Err(e) => {
                warn!("PDF extraction error: {}", e);
                Vec::new()
            }
        }
    }

    /// Extract all non-empty pages of an already loaded document.
    pub fn extract_document(&self, doc: &Document) -> Vec<Page> {
        let pages = doc.get_pages();
        let mut result = Vec::with_capacity(pages.len());

        for (&page_number, &page_id) in &pages {
            let geometry = page_geometry(doc, page_id);
            let runs = self.extract_page_runs(doc, page_id, geometry);
            debug!("Page {}: {} text runs", page_number, runs.len());

            if let Some(page) = Page::new(page_number, geometry, runs) {
                result.push(page);
            }
        }

        info!(
            "Extracted text from {} of {} pages",
            result.len(),
            pages.len()
        );
        result
    }

    /// Extract the runs of a single page, unsorted.
    ///
    /// A content stream that fails to decode yields no runs.
    pub fn extract_page_runs(
        &self,
        doc: &Document,
        page_id: ObjectId,
        geometry: PageGeometry,
    ) -> Vec<TextRun> {
        let content = match doc
            .get_page_content(page_id)
            .and_then(|data| Content::decode(&data))
        {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to decode content of page {:?}: {}", page_id, e);
                return Vec::new();
            }
        };

        let mut walker = ContentWalker {
            doc,
            resources: Resources::for_page(doc, page_id),
            extractor: self,
            geometry,
            state: TextState::new(self.default_font_size),
            saved: Vec::new(),
            form_depth: 0,
            runs: Vec::new(),
        };

        for op in &content.operations {
            walker.apply(op);
        }

        walker.runs
    }
}

/// A 2D affine matrix `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `[1 0 0 1 tx ty] x self`
    fn pre_translate(self, tx: f32, ty: f32) -> Self {
        let [a, b, c, d, e, f] = self.0;
        Self([a, b, c, d, tx * a + ty * c + e, tx * b + ty * d + f])
    }

    const fn origin(self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }
}

/// Text state that survives `q`/`Q` nesting.
#[derive(Debug, Clone)]
struct GraphicsText {
    font_resource: Vec<u8>,
    font_size: f32,
    leading: f32,
}

#[derive(Debug, Clone)]
struct TextState {
    text_matrix: Matrix,
    line_matrix: Matrix,
    gfx: GraphicsText,
}

impl TextState {
    const fn new(default_font_size: f32) -> Self {
        Self {
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            gfx: GraphicsText {
                font_resource: Vec::new(),
                font_size: default_font_size,
                leading: 0.0,
            },
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.pre_translate(tx, ty);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.gfx.leading;
        self.move_line(0.0, -leading);
    }
}

/// Fonts and XObjects a content stream can refer to by name.
#[derive(Debug, Clone, Default)]
struct Resources<'a> {
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    xobjects: BTreeMap<Vec<u8>, &'a Stream>,
}

impl<'a> Resources<'a> {
    /// Resources of a page, including those inherited from its parents.
    fn for_page(doc: &'a Document, page_id: ObjectId) -> Self {
        let mut resources = Self {
            fonts: doc.get_page_fonts(page_id).unwrap_or_default(),
            xobjects: BTreeMap::new(),
        };

        if let Ok((inline, ids)) = doc.get_page_resources(page_id) {
            let inherited = ids.into_iter().filter_map(|id| doc.get_dictionary(id).ok());
            for dict in inline.into_iter().chain(inherited) {
                resources.add_xobjects(doc, dict);
            }
        }
        resources
    }

    /// Resources of a form XObject. Names the form does not define resolve
    /// to the enclosing stream's resources.
    fn for_form(doc: &'a Document, form: &'a Stream, outer: &Self) -> Self {
        let mut resources = Self::default();
        if let Ok(dict) = doc.get_dict_in_dict(&form.dict, b"Resources") {
            resources.add_fonts(doc, dict);
            resources.add_xobjects(doc, dict);
        }

        for (name, &font) in &outer.fonts {
            resources.fonts.entry(name.clone()).or_insert(font);
        }
        for (name, &xobject) in &outer.xobjects {
            resources.xobjects.entry(name.clone()).or_insert(xobject);
        }
        resources
    }

    fn add_fonts(&mut self, doc: &'a Document, dict: &'a Dictionary) {
        let Ok(fonts) = doc.get_dict_in_dict(dict, b"Font") else {
            return;
        };
        for (name, value) in fonts {
            if let Ok((_, Object::Dictionary(font))) = doc.dereference(value) {
                self.fonts.entry(name.clone()).or_insert(font);
            }
        }
    }

    fn add_xobjects(&mut self, doc: &'a Document, dict: &'a Dictionary) {
        let Ok(xobjects) = doc.get_dict_in_dict(dict, b"XObject") else {
            return;
        };
        for (name, value) in xobjects {
            if let Ok((_, Object::Stream(stream))) = doc.dereference(value) {
                self.xobjects.entry(name.clone()).or_insert(stream);
            }
        }
    }
}

fn is_form(xobject: &Stream) -> bool {
    xobject
        .dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .is_ok_and(|subtype| subtype == b"Form")
}

struct ContentWalker<'a> {
    doc: &'a Document,
    resources: Resources<'a>,
    extractor: &'a TextExtractor,
    geometry: PageGeometry,
    state: TextState,
    saved: Vec<GraphicsText>,
    form_depth: usize,
    runs: Vec<TextRun>,
}

impl ContentWalker<'_> {
    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        let num = |i: usize| operands.get(i).and_then(number);

        match op.operator.as_str() {
            "q" => self.saved.push(self.state.gfx.clone()),
            "Q" => {
                if let Some(gfx) = self.saved.pop() {
                    self.state.gfx = gfx;
                }
            }
            "BT" => {
                self.state.text_matrix = Matrix::IDENTITY;
                self.state.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.gfx.font_resource.clone_from(name);
                }
                self.state.gfx.font_size = match num(1) {
                    Some(size) if size != 0.0 => size.abs(),
                    _ => self.extractor.default_font_size,
                };
            }
            "TL" => {
                if let Some(leading) = num(0) {
                    self.state.gfx.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.state.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.state.gfx.leading = -ty;
                    self.state.move_line(tx, ty);
                }
            }
            "Tm" => {
                let values: Vec<f32> = operands.iter().take(6).filter_map(number).collect();
                if let &[a, b, c, d, e, f] = values.as_slice() {
                    self.state.text_matrix = Matrix([a, b, c, d, e, f]);
                    self.state.line_matrix = self.state.text_matrix;
                }
            }
            "T*" => self.state.next_line(),
            "Tj" => {
                let text = operands.first().map(|obj| self.decode(obj)).unwrap_or_default();
                self.emit(&text);
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.emit(&text);
                }
            }
            "'" => {
                self.state.next_line();
                let text = operands.first().map(|obj| self.decode(obj)).unwrap_or_default();
                self.emit(&text);
            }
            "\"" => {
                self.state.next_line();
                let text = operands.get(2).map(|obj| self.decode(obj)).unwrap_or_default();
                self.emit(&text);
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.walk_form(name);
                }
            }
            _ => {}
        }
    }

    /// Walk a form XObject as if its operators appeared in place of `Do`.
    ///
    /// The form runs inside an implicit `q`/`Q`, so text state set inside
    /// it does not leak out. Image XObjects are ignored.
    fn walk_form(&mut self, name: &[u8]) {
        let Some(&form) = self.resources.xobjects.get(name) else {
            debug!("Unknown XObject {}", String::from_utf8_lossy(name));
            return;
        };
        if !is_form(form) {
            return;
        }
        if self.form_depth >= MAX_FORM_DEPTH {
            warn!(
                "Not entering form {}: nested deeper than {}",
                String::from_utf8_lossy(name),
                MAX_FORM_DEPTH
            );
            return;
        }

        let operations = match form.get_plain_content().and_then(|data| Content::decode(&data)) {
            Ok(content) => content.operations,
            Err(e) => {
                warn!("Failed to decode form {}: {}", String::from_utf8_lossy(name), e);
                return;
            }
        };

        let inner = Resources::for_form(self.doc, form, &self.resources);
        let outer = std::mem::replace(&mut self.resources, inner);
        let state = self.state.clone();
        let saved = self.saved.len();
        self.form_depth += 1;

        for op in &operations {
            self.apply(op);
        }

        self.form_depth -= 1;
        self.saved.truncate(saved);
        self.state = state;
        self.resources = outer;
    }

    fn emit(&mut self, text: &str) {
        let (x, y) = self.state.text_matrix.origin();
        if let Some(run) = TextRun::new(
            text,
            x,
            y,
            self.state.gfx.font_size,
            self.font_name(),
            self.geometry,
        ) {
            self.runs.push(run);
        }
    }

    fn font_dict(&self) -> Option<&Dictionary> {
        self.resources.fonts.get(&self.state.gfx.font_resource).copied()
    }

    fn font_name(&self) -> String {
        self.font_dict()
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|obj| obj.as_name().ok())
            .map_or_else(
                || self.extractor.fallback_font_name.clone(),
                |name| String::from_utf8_lossy(name).into_owned(),
            )
    }

    fn decode(&self, obj: &Object) -> String {
        let Object::String(bytes, _) = obj else {
            return String::new();
        };

        if let Some(text) = self
            .font_dict()
            .and_then(|font| font.get_font_encoding(self.doc).ok())
            .and_then(|encoding| Document::decode_text(&encoding, bytes).ok())
        {
            return text;
        }

        decode_fallback(bytes)
    }

    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(..) => combined.push_str(&self.decode(item)),
                other => {
                    let gap = number(other).is_some_and(|n| -n > TJ_SPACE_THRESHOLD);
                    if gap && !combined.is_empty() && !combined.ends_with(' ') {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// UTF-16BE when a byte order mark is present, Latin-1 otherwise.
fn decode_fallback(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    /// Build a one-page PDF whose content stream is `ops`, with Helvetica as `/F1`.
    fn pdf_with_ops(ops: Vec<Operation>) -> Vec<u8> {
        build_pdf(ops, None)
    }

    /// Like [`pdf_with_ops`], with `form_ops` available to the page as form
    /// XObject `/Fm1`. The form's own resources add Times-Roman as `/F2` and
    /// map `/Fm1` back to the form itself.
    fn pdf_with_form(page_ops: Vec<Operation>, form_ops: Vec<Operation>) -> Vec<u8> {
        build_pdf(page_ops, Some(form_ops))
    }

    fn build_pdf(page_ops: Vec<Operation>, form_ops: Option<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let mut resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };

        if let Some(form_ops) = form_ops {
            let times_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Times-Roman",
            });
            let form_id = doc.new_object_id();
            let form = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
                    "Resources" => dictionary! {
                        "Font" => dictionary! { "F2" => times_id },
                        "XObject" => dictionary! { "Fm1" => form_id },
                    },
                },
                Content { operations: form_ops }.encode().unwrap(),
            );
            doc.objects.insert(form_id, Object::Stream(form));
            resources.set("XObject", dictionary! { "Fm1" => form_id });
        }

        let content = Content { operations: page_ops }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Object::Array(vec![page_id.into()]),
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_matrix_pre_translate_uses_scale() {
        let m = Matrix([2.0, 0.0, 0.0, 2.0, 10.0, 20.0]).pre_translate(5.0, -3.0);
        assert_eq!(m.origin(), (20.0, 14.0));
    }

    #[test]
    fn test_tm_position_and_font() {
        let bytes = pdf_with_ops(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 750.into()]),
            op("Tj", vec![Object::string_literal("Hello, World!")]),
            op("ET", vec![]),
        ]);

        let pages = extract_pages(&bytes);
        assert_eq!(pages.len(), 1);
        let run = &pages[0].runs[0];
        assert_eq!(run.text, "Hello, World!");
        assert!((run.x - 100.0).abs() < f32::EPSILON);
        assert!((run.y - 750.0).abs() < f32::EPSILON);
        assert!((run.font_size - 12.0).abs() < f32::EPSILON);
        assert_eq!(run.font_name, "Helvetica");
        assert!((pages[0].width - 595.0).abs() < f32::EPSILON);
        assert_eq!(pages[0].page_number, 1);
    }

    #[test]
    fn test_td_and_leading_moves() {
        let bytes = pdf_with_ops(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("first")]),
            op("TD", vec![0.into(), (-14).into()]),
            op("Tj", vec![Object::string_literal("second")]),
            op("T*", vec![]),
            op("Tj", vec![Object::string_literal("third")]),
            op("'", vec![Object::string_literal("fourth")]),
            op("ET", vec![]),
        ]);

        let pages = extract_pages(&bytes);
        let ys: Vec<(String, f32)> = pages[0].runs.iter().map(|r| (r.text.clone(), r.y)).collect();
        assert_eq!(
            ys,
            vec![
                ("first".to_string(), 700.0),
                ("second".to_string(), 686.0),
                ("third".to_string(), 672.0),
                ("fourth".to_string(), 658.0),
            ]
        );
        assert!(pages[0].runs.iter().all(|r| (r.x - 72.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_tj_array_inserts_word_gaps() {
        let bytes = pdf_with_ops(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![50.into(), 500.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hel"),
                    (-20).into(),
                    Object::string_literal("lo"),
                    (-300).into(),
                    Object::string_literal("there"),
                ])],
            ),
            op("ET", vec![]),
        ]);

        let pages = extract_pages(&bytes);
        assert_eq!(pages[0].runs[0].text, "Hello there");
    }

    #[test]
    fn test_whitespace_runs_discarded_and_empty_page_dropped() {
        let bytes = pdf_with_ops(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Tj", vec![Object::string_literal("   ")]),
            op("ET", vec![]),
        ]);

        assert!(extract_pages(&bytes).is_empty());
    }

    #[test]
    fn test_missing_font_size_defaults() {
        let bytes = pdf_with_ops(vec![
            op("BT", vec![]),
            op("Td", vec![10.into(), 10.into()]),
            op("Tj", vec![Object::string_literal("no font")]),
            op("ET", vec![]),
        ]);

        let run = &extract_pages(&bytes)[0].runs[0];
        assert!((run.font_size - 12.0).abs() < f32::EPSILON);
        assert_eq!(run.font_name, "Helvetica");
    }

    #[test]
    fn test_font_state_restored_by_q() {
        let bytes = pdf_with_ops(vec![
            op("Tf", vec!["F1".into(), 9.into()]),
            op("q", vec![]),
            op("Tf", vec!["F1".into(), 30.into()]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![10.into(), 10.into()]),
            op("Tj", vec![Object::string_literal("small")]),
            op("ET", vec![]),
        ]);

        let run = &extract_pages(&bytes)[0].runs[0];
        assert!((run.font_size - 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_inside_form_xobject() {
        let bytes = pdf_with_form(
            vec![op("Do", vec!["Fm1".into()])],
            vec![
                op("BT", vec![]),
                op("Tf", vec!["F1".into(), 12.into()]),
                op("Td", vec![100.into(), 750.into()]),
                op("Tj", vec![Object::string_literal("Inside form")]),
                op("ET", vec![]),
            ],
        );

        let pages = extract_pages(&bytes);
        assert_eq!(pages.len(), 1);
        let run = &pages[0].runs[0];
        assert_eq!(run.text, "Inside form");
        assert!((run.x - 100.0).abs() < f32::EPSILON);
        assert!((run.y - 750.0).abs() < f32::EPSILON);
        assert_eq!(run.font_name, "Helvetica");
    }

    #[test]
    fn test_form_fonts_and_state_stay_inside_form() {
        let bytes = pdf_with_form(
            vec![
                op("Tf", vec!["F1".into(), 9.into()]),
                op("Do", vec!["Fm1".into()]),
                op("BT", vec![]),
                op("Td", vec![10.into(), 100.into()]),
                op("Tj", vec![Object::string_literal("after")]),
                op("ET", vec![]),
            ],
            vec![
                op("BT", vec![]),
                op("Tf", vec!["F2".into(), 30.into()]),
                op("Td", vec![50.into(), 600.into()]),
                op("Tj", vec![Object::string_literal("inner")]),
                op("ET", vec![]),
            ],
        );

        let runs = &extract_pages(&bytes)[0].runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "inner");
        assert_eq!(runs[0].font_name, "Times-Roman");
        assert!((runs[0].font_size - 30.0).abs() < f32::EPSILON);
        assert_eq!(runs[1].text, "after");
        assert_eq!(runs[1].font_name, "Helvetica");
        assert!((runs[1].font_size - 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_self_referencing_form_stops_at_depth_limit() {
        let bytes = pdf_with_form(
            vec![op("Do", vec!["Fm1".into()])],
            vec![
                op("BT", vec![]),
                op("Tf", vec!["F1".into(), 12.into()]),
                op("Td", vec![10.into(), 10.into()]),
                op("Tj", vec![Object::string_literal("again")]),
                op("ET", vec![]),
                op("Do", vec!["Fm1".into()]),
            ],
        );

        let pages = extract_pages(&bytes);
        assert_eq!(pages[0].runs.len(), MAX_FORM_DEPTH);
    }

    #[test]
    fn test_unknown_xobject_ignored() {
        let bytes = pdf_with_ops(vec![
            op("Do", vec!["Missing".into()]),
            op("BT", vec![]),
            op("Td", vec![10.into(), 10.into()]),
            op("Tj", vec![Object::string_literal("still here")]),
            op("ET", vec![]),
        ]);

        assert_eq!(extract_pages(&bytes)[0].runs[0].text, "still here");
    }

    #[test]
    fn test_garbage_bytes_extract_nothing() {
        assert!(extract_pages(b"definitely not a pdf").is_empty());
        assert!(extract_pages(&[]).is_empty());
    }

    #[test]
    fn test_decode_fallback() {
        assert_eq!(decode_fallback(&[0xFE, 0xFF, 0x12, 0x30]), "\u{1230}");
        assert_eq!(decode_fallback(b"caf\xe9"), "café");
    }
}
