//! End-to-end tests on PDFs built with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream};

use unprova::render::{export_question_regions_pdf, region_overlays, to_pdf_rect};
use unprova::transform::build_question_rectangles;
use unprova::{find_positions, parse_bytes, PdfParser, TransformConfig};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;

/// Page setup for [`build_pdf`].
struct PdfSpec<'a> {
    base_font: &'a str,
    crop_box: Option<[i64; 4]>,
}

impl Default for PdfSpec<'_> {
    fn default() -> Self {
        Self {
            base_font: "Helvetica",
            crop_box: None,
        }
    }
}

/// Build a PDF whose pages hold 12pt text runs at (x, baseline), one show
/// operation per run.
fn build_pdf(spec: PdfSpec<'_>, pages: &[Vec<(&str, f32, f32)>]) -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => spec.base_font,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for (text, x, baseline) in runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![(*x).into(), (*baseline).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if let Some(crop) = spec.crop_box {
            page.set("CropBox", crop.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Build a PDF whose pages hold single-line text runs at x=72.
fn exam_pdf(pages: &[Vec<(&str, f32)>]) -> Vec<u8> {
    let pages: Vec<Vec<(&str, f32, f32)>> = pages
        .iter()
        .map(|lines| lines.iter().map(|(t, y)| (*t, 72.0, *y)).collect())
        .collect();
    build_pdf(PdfSpec::default(), &pages)
}

fn sample_exam() -> Vec<u8> {
    exam_pdf(&[
        vec![
            ("Questao 1", 780.0),
            ("Um bloco desliza sem atrito.", 760.0),
            ("A ( ) 1 m/s", 700.0),
            ("B ( ) 2 m/s", 686.0),
            ("Questao 2", 400.0),
            ("Calcule a energia.", 380.0),
        ],
        vec![
            ("QUESTAO", 780.0),
            ("3", 766.0),
            ("Considere o circuito.", 740.0),
            ("Questao 4", 300.0),
        ],
    ])
}

/// Top of a 12pt line with the given baseline, in top-down page space.
fn line_top(baseline: f32) -> f32 {
    PAGE_HEIGHT as f32 - (baseline + 0.8 * 12.0)
}

fn export_regions(data: &[u8], path: &std::path::Path) -> TransformConfig {
    let parser = PdfParser::from_bytes(data).unwrap();
    let doc = parser.parse().unwrap();
    let config = TransformConfig::default();
    let positions = find_positions(&doc, 60).unwrap();
    let rects = build_question_rectangles(&doc, &positions, &config);
    export_question_regions_pdf(
        parser.backend().raw_doc(),
        &rects,
        path,
        config.regions_stroke_color,
        config.regions_stroke_width,
    )
    .unwrap();
    config
}

/// Collect the operands of every `re` operator on each page.
fn drawn_rectangles(doc: &LopdfDocument) -> Vec<(u32, [f32; 4])> {
    let mut out = Vec::new();
    for (page_no, page_id) in doc.get_pages() {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        for op in content.operations.iter().filter(|op| op.operator == "re") {
            let v: Vec<f32> = op.operands.iter().map(|o| o.as_float().unwrap()).collect();
            out.push((page_no, [v[0], v[1], v[2], v[3]]));
        }
    }
    out
}

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 0.05, "{a} != {b}");
}

#[test]
fn test_positions_from_pdf() {
    let doc = parse_bytes(&sample_exam()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.pages[0].rect.width(), 595.0);

    let positions = find_positions(&doc, 60).unwrap();
    let found: Vec<(u32, usize)> = positions.iter().map(|p| (p.number, p.page_index)).collect();
    assert_eq!(found, vec![(1, 0), (2, 0), (3, 1), (4, 1)]);
    assert_close(positions[0].start_rect.y0, line_top(780.0));
    assert_close(positions[2].start_rect.y0, line_top(780.0));
}

#[test]
fn test_objective_trim_on_parsed_pdf() {
    let doc = parse_bytes(&sample_exam()).unwrap();
    let config = TransformConfig::default();
    let positions = find_positions(&doc, 60).unwrap();
    let rects = build_question_rectangles(&doc, &positions, &config);

    let q1 = rects[&1][0].rect;
    let b_bottom = PAGE_HEIGHT as f32 - (686.0 - 0.2 * 12.0);
    assert_close(q1.y1, b_bottom + config.objective_block_end_margin);
    assert_close(q1.y0, line_top(780.0) - config.margin_top);

    let q2 = rects[&2][0].rect;
    assert_close(q2.y1, PAGE_HEIGHT as f32);
}

#[test]
fn test_regions_pdf_round_trip() {
    let data = sample_exam();
    let parser = PdfParser::from_bytes(&data).unwrap();
    let doc = parser.parse().unwrap();
    let config = TransformConfig::default();
    let positions = find_positions(&doc, 60).unwrap();
    let rects = build_question_rectangles(&doc, &positions, &config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figs").join("questoes_regioes.pdf");
    export_question_regions_pdf(
        parser.backend().raw_doc(),
        &rects,
        &path,
        config.regions_stroke_color,
        config.regions_stroke_width,
    )
    .unwrap();

    let saved = LopdfDocument::load(&path).unwrap();
    let drawn = drawn_rectangles(&saved);

    let media_box = [0.0, 0.0, PAGE_WIDTH as f32, PAGE_HEIGHT as f32];
    let expected: Vec<(u32, [f32; 4])> = region_overlays(&rects)
        .into_iter()
        .flat_map(|(page, rs)| {
            rs.into_iter()
                .map(move |r| (page as u32 + 1, to_pdf_rect(&r, media_box)))
        })
        .collect();

    assert_eq!(drawn.len(), expected.len());
    for ((page_a, a), (page_b, b)) in drawn.iter().zip(expected.iter()) {
        assert_eq!(page_a, page_b);
        for i in 0..4 {
            assert_close(a[i], b[i]);
        }
    }
}

#[test]
fn test_regions_pdf_keeps_page_text() {
    let data = sample_exam();
    let parser = PdfParser::from_bytes(&data).unwrap();
    let doc = parser.parse().unwrap();
    let config = TransformConfig::default();
    let positions = find_positions(&doc, 60).unwrap();
    let rects = build_question_rectangles(&doc, &positions, &config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regioes.pdf");
    export_question_regions_pdf(parser.backend().raw_doc(), &rects, &path, [0.0, 0.0, 1.0], 2.0)
        .unwrap();

    let annotated = unprova::parse_file(&path).unwrap();
    let again = find_positions(&annotated, 60).unwrap();
    assert_eq!(again, positions);
}

#[test]
fn test_marker_split_across_show_operations() {
    // Times-Roman "Questao" is narrower than the width estimate, so the
    // numeral run starts where the estimate says the word ends.
    let data = build_pdf(
        PdfSpec {
            base_font: "Times-Roman",
            ..PdfSpec::default()
        },
        &[vec![("Questao", 72.0, 780.0), ("07", 114.0, 780.0), ("Enunciado.", 72.0, 760.0)]],
    );
    let doc = parse_bytes(&data).unwrap();
    assert_eq!(doc.pages[0].lines[0].text, "Questao 07");

    let positions = find_positions(&doc, 60).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].number, 7);
    assert_close(positions[0].start_rect.x0, 72.0);
}

#[test]
fn test_crop_box_sets_page_geometry() {
    let crop = [20, 30, 575, 812];
    let data = build_pdf(
        PdfSpec {
            crop_box: Some(crop),
            ..PdfSpec::default()
        },
        &[vec![("Questao 1", 72.0, 780.0), ("Questao 2", 72.0, 400.0)]],
    );
    let doc = parse_bytes(&data).unwrap();
    let page = &doc.pages[0];
    assert_close(page.rect.width(), 555.0);
    assert_close(page.rect.height(), 782.0);

    // Text is relative to the CropBox's top-left corner
    let positions = find_positions(&doc, 60).unwrap();
    assert_close(positions[0].start_rect.x0, 72.0 - 20.0);
    assert_close(positions[0].start_rect.y0, 812.0 - (780.0 + 0.8 * 12.0));

    // Outlines land back on the same PDF coordinates
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regioes.pdf");
    let config = export_regions(&data, &path);
    let rects = build_question_rectangles(&doc, &positions, &config);
    let drawn = drawn_rectangles(&LopdfDocument::load(&path).unwrap());
    let q1 = rects[&1][0].rect;
    let bounds = [20.0, 30.0, 575.0, 812.0];
    assert_eq!(drawn.len(), 2);
    let expected = to_pdf_rect(&q1, bounds);
    for i in 0..4 {
        assert_close(drawn[0].1[i], expected[i]);
    }
    assert_close(drawn[0].1[0], 20.0);
    assert_close(drawn[0].1[1] + drawn[0].1[3], 812.0 - q1.y0);
}
