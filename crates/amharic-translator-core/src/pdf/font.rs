//! Target-script font selection and embedding.
//!
//! Ethiopic text needs a TrueType font carrying the glyphs, embedded as a
//! composite font:
//! - **Type0 font**: the top-level font dictionary that references:
//!   - **CIDFontType2**: glyph widths (`W`) and a reference to:
//!     - **FontDescriptor**: font metrics and the **FontFile2** program
//!   - **ToUnicode CMap**: maps glyph IDs back to Unicode for copy/paste
//!
//! Text is written with Identity-H encoding, two bytes of glyph ID per
//! character. Widths and the ToUnicode CMap only cover glyphs that were
//! actually drawn, so fonts are embedded after all pages are laid out.
//!
//! When no TrueType candidate is usable the chain ends in a builtin Type1
//! font, which cannot fail but can only draw WinAnsi characters.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, info, warn};
use ttf_parser::{Face, GlyphId, name_id};

use crate::config::{DEFAULT_FONT_NAME, LayoutConfig};
use crate::error::{Error, Result};

/// ETHIOPIC SYLLABLE HA, the probe glyph a target-script font must carry
const ETHIOPIC_PROBE: char = '\u{1200}';

/// Maximum entries in one `beginbfchar` block
const BFCHAR_BLOCK: usize = 100;

/// One link of the font fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A TrueType file on disk
    TrueType(PathBuf),
    /// One of the standard 14 Type1 fonts, always available
    Builtin(String),
}

/// Ordered font candidates, evaluated first to last.
///
/// The chain always ends in a [`FontSource::Builtin`], so resolving it
/// cannot fail.
#[derive(Debug, Clone)]
pub struct FontChain {
    sources: Vec<FontSource>,
}

impl FontChain {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, builtin: impl Into<String>) -> Self {
        let mut sources: Vec<FontSource> = paths.into_iter().map(FontSource::TrueType).collect();
        sources.push(FontSource::Builtin(builtin.into()));
        Self { sources }
    }

    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self::new(layout.font_paths.iter().cloned(), layout.fallback_font_name.clone())
    }

    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }

    /// Return the first usable font.
    pub fn resolve(&self) -> RenderFont {
        for source in &self.sources {
            match source {
                FontSource::TrueType(path) => match EmbeddedFont::load(path) {
                    Ok(font) => {
                        info!("Using font {} ({})", font.base_name, path.display());
                        return RenderFont::Embedded(font);
                    }
                    Err(e) => debug!("Skipping font candidate: {}", e),
                },
                FontSource::Builtin(name) => {
                    warn!("No Ethiopic font available, falling back to builtin {}", name);
                    return RenderFont::Builtin(BuiltinFont::new(name.clone()));
                }
            }
        }

        RenderFont::Builtin(BuiltinFont::new(DEFAULT_FONT_NAME))
    }
}

/// The font a document is drawn with.
#[derive(Debug)]
pub enum RenderFont {
    Embedded(EmbeddedFont),
    Builtin(BuiltinFont),
}

impl RenderFont {
    /// Encode text as a `Tj` operand, recording the glyphs used.
    pub fn encode(&mut self, text: &str) -> Result<Object> {
        match self {
            Self::Embedded(font) => font.encode(text),
            Self::Builtin(font) => Ok(font.encode(text)),
        }
    }

    /// Write the font objects into `doc`, with the font dictionary at `font_id`.
    pub fn embed(&self, doc: &mut Document, font_id: ObjectId) -> Result<()> {
        match self {
            Self::Embedded(font) => font.embed(doc, font_id),
            Self::Builtin(font) => {
                font.embed(doc, font_id);
                Ok(())
            }
        }
    }

    pub fn base_name(&self) -> &str {
        match self {
            Self::Embedded(font) => &font.base_name,
            Self::Builtin(font) => &font.name,
        }
    }

    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

/// A TrueType font that will be embedded in the output.
pub struct EmbeddedFont {
    path: PathBuf,
    data: Vec<u8>,
    base_name: String,
    /// Glyphs drawn so far, with the character each one stands for
    used: BTreeMap<u16, char>,
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("path", &self.path)
            .field("base_name", &self.base_name)
            .field("used", &self.used.len())
            .finish_non_exhaustive()
    }
}

impl EmbeddedFont {
    /// Read and validate a TrueType file.
    ///
    /// Fails when the file is unreadable, does not parse, or has no
    /// Ethiopic glyphs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| font_error(path, e))?;

        let base_name = {
            let face = Face::parse(&data, 0).map_err(|e| font_error(path, e))?;
            if face.glyph_index(ETHIOPIC_PROBE).is_none() {
                return Err(font_error(path, "font has no Ethiopic glyphs"));
            }
            postscript_name(&face).unwrap_or_else(|| fallback_name(path))
        };

        Ok(Self {
            path: path.to_path_buf(),
            data,
            base_name,
            used: BTreeMap::new(),
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0).map_err(|e| font_error(&self.path, e))
    }

    /// Encode text as big-endian glyph IDs.
    ///
    /// Characters the font has no glyph for are left out. Fails only when
    /// none of the characters can be drawn.
    pub fn encode(&mut self, text: &str) -> Result<Object> {
        let face = Face::parse(&self.data, 0).map_err(|e| font_error(&self.path, e))?;

        let mut bytes = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            if let Some(gid) = face.glyph_index(c) {
                bytes.extend_from_slice(&gid.0.to_be_bytes());
                self.used.entry(gid.0).or_insert(c);
            } else {
                debug!("No glyph for {:?} in {}", c, self.base_name);
            }
        }

        if bytes.is_empty() {
            return Err(Error::RenderFailed(format!(
                "no glyphs for {text:?} in {}",
                self.base_name
            )));
        }

        Ok(Object::String(bytes, StringFormat::Hexadecimal))
    }

    /// Add the composite font to `doc`.
    #[allow(clippy::cast_possible_wrap)] // Font files are far below i64::MAX bytes
    pub fn embed(&self, doc: &mut Document, font_id: ObjectId) -> Result<()> {
        let face = self.face()?;
        let units_per_em = i64::from(face.units_per_em()).max(1);
        let scale = |width: u16| i64::from(width) * 1000 / units_per_em;

        let mut font_file = Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.clone(),
        );
        if let Err(e) = font_file.compress() {
            warn!("Embedding {} uncompressed: {}", self.base_name, e);
        }
        let font_file_id = doc.add_object(font_file);

        let bbox = face.global_bounding_box();
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(self.base_name.clone().into_bytes()),
            "Flags" => 4, // Symbolic
            "FontBBox" => Object::Array(vec![
                i64::from(bbox.x_min).into(),
                i64::from(bbox.y_min).into(),
                i64::from(bbox.x_max).into(),
                i64::from(bbox.y_max).into(),
            ]),
            "ItalicAngle" => 0,
            "Ascent" => i64::from(face.ascender()),
            "Descent" => i64::from(face.descender()),
            "CapHeight" => i64::from(face.capital_height().unwrap_or_else(|| face.ascender())),
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });

        let widths: BTreeMap<u16, i64> = self
            .used
            .keys()
            .map(|&gid| (gid, scale(face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0))))
            .collect();
        let default_width = face
            .glyph_index(' ')
            .and_then(|gid| face.glyph_hor_advance(gid))
            .map_or(1000, scale);

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => Object::Name(self.base_name.clone().into_bytes()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => default_width,
            "W" => Object::Array(widths_array(&widths)),
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = doc.add_object(Stream::new(
            Dictionary::new(),
            to_unicode_cmap(&self.used).into_bytes(),
        ));

        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => Object::Name(self.base_name.clone().into_bytes()),
                "Encoding" => "Identity-H",
                "DescendantFonts" => Object::Array(vec![cid_font_id.into()]),
                "ToUnicode" => to_unicode_id,
            }),
        );

        debug!("Embedded {} with {} glyphs", self.base_name, self.used.len());
        Ok(())
    }
}

/// A standard Type1 font drawn with WinAnsi encoding.
#[derive(Debug, Clone)]
pub struct BuiltinFont {
    name: String,
}

impl BuiltinFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Encode text, drawing `?` for anything outside WinAnsi.
    pub fn encode(&self, text: &str) -> Object {
        let bytes = text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect();
        Object::String(bytes, StringFormat::Literal)
    }

    pub fn embed(&self, doc: &mut Document, font_id: ObjectId) {
        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Object::Name(self.name.clone().into_bytes()),
                "Encoding" => "WinAnsiEncoding",
            }),
        );
    }
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(c)).ok()?,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => return None,
    };
    Some(byte)
}

/// Build a CIDFont `W` array, grouping consecutive glyph IDs:
/// `[gid [w1 w2 ...] gid [w ...]]`.
fn widths_array(widths: &BTreeMap<u16, i64>) -> Vec<Object> {
    let mut result = Vec::new();
    let mut iter = widths.iter().peekable();

    while let Some((&first_gid, &first_width)) = iter.next() {
        let mut group = vec![Object::Integer(first_width)];
        let mut expected = u32::from(first_gid) + 1;

        while let Some(&(&gid, &width)) = iter.peek() {
            if u32::from(gid) != expected {
                break;
            }
            group.push(Object::Integer(width));
            expected += 1;
            iter.next();
        }

        result.push(Object::Integer(i64::from(first_gid)));
        result.push(Object::Array(group));
    }

    result
}

/// A ToUnicode CMap with one `bfchar` entry per drawn glyph.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<(&u16, &char)> = used.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        let _ = writeln!(cmap, "{} beginbfchar", block.len());
        for &(&gid, &c) in block {
            let mut units = [0u16; 2];
            let unicode: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            let _ = writeln!(cmap, "<{gid:04X}> <{unicode}>");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn postscript_name(face: &Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .map(|name| sanitize_name(&name))
        .filter(|name| !name.is_empty())
}

fn fallback_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| sanitize_name(&s.to_string_lossy()))
        .unwrap_or_default();
    if stem.is_empty() { "EthiopicFont".to_string() } else { stem }
}

/// Keep only characters that are safe in a PDF name.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn font_error(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::FontLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// A minimal TrueType face for tests.
///
/// It has no outlines, only what [`EmbeddedFont`] reads: a `cmap` covering
/// the space and the Ethiopic block, advances in `hmtx`, and the `head`,
/// `hhea` and `maxp` headers.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};

    pub(crate) const UNITS_PER_EM: u16 = 1000;
    pub(crate) const NOTDEF_ADVANCE: u16 = 500;
    pub(crate) const SPACE_ADVANCE: u16 = 250;
    pub(crate) const ETHIOPIC_ADVANCE: u16 = 600;

    const ETHIOPIC_FIRST: u32 = 0x1200;
    const ETHIOPIC_LAST: u32 = 0x137F;
    const SPACE_GLYPH: u16 = 1;
    const FIRST_ETHIOPIC_GLYPH: u16 = 2;

    /// Glyph ID the face maps `c` to.
    pub(crate) fn glyph_for(c: char) -> Option<u16> {
        match u32::from(c) {
            0x20 => Some(SPACE_GLYPH),
            code @ ETHIOPIC_FIRST..=ETHIOPIC_LAST => {
                u16::try_from(code - ETHIOPIC_FIRST).ok().map(|i| i + FIRST_ETHIOPIC_GLYPH)
            }
            _ => None,
        }
    }

    /// Write the face to `dir` and return its path.
    pub(crate) fn write_face(dir: &Path) -> PathBuf {
        let path = dir.join("TestEthiopic.ttf");
        std::fs::write(&path, face_bytes()).unwrap();
        path
    }

    pub(crate) fn face_bytes() -> Vec<u8> {
        let ethiopic = u16::try_from(ETHIOPIC_LAST - ETHIOPIC_FIRST + 1).unwrap();
        let num_glyphs = FIRST_ETHIOPIC_GLYPH + ethiopic;

        let mut head = Vec::new();
        put_u32(&mut head, 0x0001_0000); // version
        put_u32(&mut head, 0x0001_0000); // fontRevision
        put_u32(&mut head, 0); // checkSumAdjustment
        put_u32(&mut head, 0x5F0F_3CF5); // magicNumber
        put_u16(&mut head, 0); // flags
        put_u16(&mut head, UNITS_PER_EM);
        head.extend_from_slice(&[0; 16]); // created, modified
        for v in [0i16, -200, 1000, 800] {
            head.extend_from_slice(&v.to_be_bytes()); // bounding box
        }
        head.extend_from_slice(&[0; 6]); // macStyle, lowestRecPPEM, fontDirectionHint
        put_u16(&mut head, 0); // indexToLocFormat
        put_u16(&mut head, 0); // glyphDataFormat

        let mut hhea = Vec::new();
        put_u32(&mut hhea, 0x0001_0000);
        hhea.extend_from_slice(&800i16.to_be_bytes()); // ascender
        hhea.extend_from_slice(&(-200i16).to_be_bytes()); // descender
        put_u16(&mut hhea, 0); // lineGap
        hhea.extend_from_slice(&[0; 24]);
        put_u16(&mut hhea, num_glyphs); // numberOfHMetrics

        let mut maxp = Vec::new();
        put_u32(&mut maxp, 0x0000_5000);
        put_u16(&mut maxp, num_glyphs);

        let mut hmtx = Vec::new();
        for gid in 0..num_glyphs {
            let advance = match gid {
                0 => NOTDEF_ADVANCE,
                SPACE_GLYPH => SPACE_ADVANCE,
                _ => ETHIOPIC_ADVANCE,
            };
            put_u16(&mut hmtx, advance);
            put_u16(&mut hmtx, 0); // left side bearing
        }

        // One format 12 subtable for the Unicode platform
        let groups = [
            (0x20, 0x20, u32::from(SPACE_GLYPH)),
            (ETHIOPIC_FIRST, ETHIOPIC_LAST, u32::from(FIRST_ETHIOPIC_GLYPH)),
        ];
        let mut cmap = Vec::new();
        put_u16(&mut cmap, 0); // version
        put_u16(&mut cmap, 1); // numTables
        put_u16(&mut cmap, 0); // platformID: Unicode
        put_u16(&mut cmap, 4); // encodingID: full repertoire
        put_u32(&mut cmap, 12); // subtable offset
        put_u16(&mut cmap, 12); // format
        put_u16(&mut cmap, 0); // reserved
        put_u32(&mut cmap, 16 + 12 * 2); // length
        put_u32(&mut cmap, 0); // language
        put_u32(&mut cmap, 2); // numGroups
        for (first, last, glyph) in groups {
            put_u32(&mut cmap, first);
            put_u32(&mut cmap, last);
            put_u32(&mut cmap, glyph);
        }

        assemble(&[
            (*b"cmap", cmap),
            (*b"head", head),
            (*b"hhea", hhea),
            (*b"hmtx", hmtx),
            (*b"maxp", maxp),
        ])
    }

    /// Lay out the table directory followed by 4-byte aligned tables.
    fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
        let count = u16::try_from(tables.len()).unwrap();
        let mut font = Vec::new();
        put_u32(&mut font, 0x0001_0000); // sfntVersion: TrueType
        put_u16(&mut font, count);
        font.extend_from_slice(&[0; 6]); // searchRange, entrySelector, rangeShift

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in tables {
            font.extend_from_slice(tag);
            put_u32(&mut font, 0); // checksum
            put_u32(&mut font, u32::try_from(offset).unwrap());
            put_u32(&mut font, u32::try_from(data.len()).unwrap());

            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }

        font.extend_from_slice(&body);
        font
    }

    fn put_u16(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    fn put_u32(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_be_bytes());
    }
}
