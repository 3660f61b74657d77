//! Annotated copy of the source PDF with every question clip outlined.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::Result;
use crate::model::{QuestionRects, Rect};
use crate::parser::page_box;

/// Rectangles to outline on each page, keyed by 0-based page index.
///
/// Each question contributes the first clip it has on a page, in question
/// order. The result depends only on `rects`.
pub fn region_overlays(rects: &QuestionRects) -> BTreeMap<usize, Vec<Rect>> {
    let mut overlays: BTreeMap<usize, Vec<Rect>> = BTreeMap::new();
    for clips in rects.values() {
        let mut seen_pages = Vec::new();
        for clip in clips {
            if seen_pages.contains(&clip.page_index) {
                continue;
            }
            seen_pages.push(clip.page_index);
            overlays.entry(clip.page_index).or_default().push(clip.rect);
        }
    }
    overlays
}

/// Convert a page-space rectangle into `re` operands `[x, y, width, height]`
/// in PDF user space. `bounds` is the visible page box the rectangle is
/// relative to (the CropBox when the page has one).
pub fn to_pdf_rect(rect: &Rect, bounds: [f32; 4]) -> [f32; 4] {
    let [llx, _, _, ury] = bounds;
    [
        llx + rect.x0,
        ury - rect.y1,
        rect.width(),
        rect.height(),
    ]
}

/// Content operations that outline `rects` with the given stroke.
///
/// The stream starts with `Q` to leave the graphics state the page content
/// was wrapped in.
pub fn overlay_operations(
    rects: &[Rect],
    bounds: [f32; 4],
    color: [f32; 3],
    width: f32,
) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("Q", vec![]),
        Operation::new("q", vec![]),
        Operation::new("RG", color.iter().map(|c| (*c).into()).collect()),
        Operation::new("w", vec![width.into()]),
    ];
    for rect in rects {
        let re = to_pdf_rect(rect, bounds);
        ops.push(Operation::new("re", re.iter().map(|v| (*v).into()).collect()));
        ops.push(Operation::new("S", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Save a copy of `source` with every clip of `rects` outlined.
pub fn export_question_regions_pdf(
    source: &LopdfDocument,
    rects: &QuestionRects,
    output_path: &Path,
    color: [f32; 3],
    width: f32,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = source.clone();
    let pages = out.get_pages();
    let mut outlined = 0;

    for (page_index, page_rects) in region_overlays(rects) {
        let Some(&page_id) = pages.get(&(page_index as u32 + 1)) else {
            log::warn!("No page {} in source PDF; skipping its outlines", page_index);
            continue;
        };
        let bounds = page_box(&out, page_id)?;
        let overlay = Content {
            operations: overlay_operations(&page_rects, bounds, color, width),
        }
        .encode()?;

        let save_id = out.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let overlay_id = out.add_object(Stream::new(dictionary! {}, overlay));

        let mut contents = vec![Object::Reference(save_id)];
        contents.extend(existing_contents(&out, page_id));
        contents.push(Object::Reference(overlay_id));
        out.get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        outlined += page_rects.len();
    }

    out.save(output_path)?;
    log::info!(
        "Saved regions PDF with {} outlines to {}",
        outlined,
        output_path.display()
    );
    Ok(())
}

/// The page's content streams as a flat list of objects.
fn existing_contents(doc: &LopdfDocument, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(other) => vec![other.clone()],
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionClip;

    #[test]
    fn test_region_overlays_group_by_page() {
        let mut rects = QuestionRects::new();
        rects.insert(
            1,
            vec![
                QuestionClip::new(0, Rect::new(0.0, 500.0, 595.0, 842.0)),
                QuestionClip::new(1, Rect::new(0.0, 0.0, 595.0, 200.0)),
            ],
        );
        rects.insert(2, vec![QuestionClip::new(1, Rect::new(0.0, 210.0, 595.0, 600.0))]);
        let overlays = region_overlays(&rects);
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[&0].len(), 1);
        assert_eq!(overlays[&1][1].y0, 210.0);
        assert_eq!(region_overlays(&rects), overlays);
    }

    #[test]
    fn test_to_pdf_rect_flips_y() {
        let rect = Rect::new(10.0, 100.0, 300.0, 250.0);
        assert_eq!(to_pdf_rect(&rect, [0.0, 0.0, 595.0, 842.0]), [10.0, 592.0, 290.0, 150.0]);
        assert_eq!(to_pdf_rect(&rect, [5.0, 10.0, 600.0, 852.0]), [15.0, 602.0, 290.0, 150.0]);
    }

    #[test]
    fn test_overlay_operations_shape() {
        let ops = overlay_operations(
            &[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 20.0, 10.0, 30.0)],
            [0.0, 0.0, 100.0, 100.0],
            [1.0, 0.0, 0.0],
            1.5,
        );
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["Q", "q", "RG", "w", "re", "S", "re", "S", "Q"]);
    }
}
