//! Page geometry lookup.
//!
//! `CropBox`, `MediaBox` and `Rotate` are inheritable page attributes, so a
//! missing key on the page dictionary is looked up on its `Parent` chain.

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::model::PageGeometry;

/// Guards against circular `Parent` references in malformed files.
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Read the visible box and rotation of a page.
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return PageGeometry::default();
    };

    let visible_box = inherited(doc, page, b"CropBox")
        .and_then(|obj| as_rect(doc, obj))
        .or_else(|| inherited(doc, page, b"MediaBox").and_then(|obj| as_rect(doc, obj)));

    let defaults = PageGeometry::default();
    let (width, height) = visible_box.map_or((defaults.width, defaults.height), |[x0, y0, x1, y1]| {
        ((x1 - x0).abs(), (y1 - y0).abs())
    });

    let rotation = inherited(doc, page, b"Rotate")
        .and_then(|obj| resolve(doc, obj).as_i64().ok())
        .map_or(0, normalize_rotation);

    PageGeometry {
        width,
        height,
        rotation,
    }
}

/// Clamp a `/Rotate` value to 0, 90, 180 or 270.
pub fn normalize_rotation(degrees: i64) -> i64 {
    let degrees = degrees.rem_euclid(360);
    if degrees % 90 == 0 { degrees } else { 0 }
}

/// Look a key up on the page, then on each ancestor `Pages` node.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn as_rect(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let values: Vec<f32> = resolve(doc, obj)
        .as_array()
        .ok()?
        .iter()
        .filter_map(|item| number(resolve(doc, item)))
        .collect();

    match values.as_slice() {
        &[x0, y0, x1, y1] => Some([x0, y0, x1, y1]),
        _ => None,
    }
}

/// Read an integer or real operand as `f32`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
