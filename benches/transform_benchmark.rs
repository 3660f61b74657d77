//! Benchmarks for unprova parsing and segmentation.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic booklets: raw PDFs for parsing and in-memory
//! documents for the detection stages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use unprova::model::{Document, Page, Rect, TextLine};
use unprova::transform::{
    build_question_rectangles, find_question_positions, merge_intervals,
    non_question_intervals_on_page, QuestionPatterns, TransformConfig,
};

/// Creates a minimal synthetic PDF with two question markers per page.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::new();

    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 3)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));

    let mut next_obj = 3;
    for i in 0..page_count {
        let page_obj = next_obj;
        let content_obj = next_obj + 1;
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));

        let text = format!(
            "BT /F1 12 Tf 72 780 Td (Questao {}) Tj 0 -20 Td (Enunciado da questao.) Tj \
             0 -20 Td (A \\( \\) 1) Tj ET BT /F1 12 Tf 72 400 Td (Questao {}) Tj ET",
            i * 2 + 1,
            i * 2 + 2
        );
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    // Placeholder offsets; lopdf rebuilds the table when it does not match
    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }

    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

/// In-memory booklet with `page_count` pages of three questions each.
fn create_test_document(page_count: usize) -> Document {
    let pages = (0..page_count)
        .map(|p| {
            let mut lines = Vec::new();
            for q in 0..3 {
                let y = 60.0 + q as f32 * 260.0;
                let number = p * 3 + q + 1;
                lines.push(TextLine::new(
                    format!("QUESTÃO {:02}", number),
                    Rect::new(56.0, y, 140.0, y + 12.0),
                    11.0,
                ));
                for (k, letter) in ['A', 'B', 'C', 'D', 'E'].iter().enumerate() {
                    let oy = y + 120.0 + k as f32 * 14.0;
                    lines.push(TextLine::new(
                        format!("{letter} ( ) alternativa"),
                        Rect::new(70.0, oy, 220.0, oy + 11.0),
                        11.0,
                    ));
                }
            }
            Page::a4(p).with_lines(lines)
        })
        .collect();
    Document::from_pages(pages)
}

/// Benchmark PDF header sniffing.
fn bench_sniff(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("sniff_valid_pdf", |b| {
        b.iter(|| unprova::sniff_pdf_version(black_box(&pdf_data)).unwrap());
    });

    c.bench_function("sniff_non_pdf", |b| {
        b.iter(|| unprova::sniff_pdf_version(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark PDF parsing at various sizes.
fn bench_pdf_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_parsing");

    for page_count in [1, 10, 30].iter() {
        let data = create_test_pdf(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                let options = unprova::ParseOptions::new().lenient();
                let _ = unprova::parse_bytes_with_options(black_box(&data), options);
            });
        });
    }

    group.finish();
}

/// Benchmark detection and region building on a 20-page booklet.
fn bench_segmentation(c: &mut Criterion) {
    let doc = create_test_document(20);
    let config = TransformConfig::default();
    let patterns = QuestionPatterns::new().unwrap();

    c.bench_function("find_question_positions", |b| {
        b.iter(|| find_question_positions(black_box(&doc), &patterns, config.max_questions));
    });

    let positions = find_question_positions(&doc, &patterns, config.max_questions);
    c.bench_function("build_question_rectangles", |b| {
        b.iter(|| build_question_rectangles(black_box(&doc), black_box(&positions), &config));
    });

    let rects = build_question_rectangles(&doc, &positions, &config);
    c.bench_function("non_question_intervals", |b| {
        b.iter(|| {
            for page in &doc.pages {
                black_box(non_question_intervals_on_page(&rects, page.index, &page.rect, 1.0));
            }
        });
    });

    let intervals: Vec<(f32, f32)> = (0..1000)
        .map(|i| (i as f32 * 3.0, i as f32 * 3.0 + 4.0))
        .collect();
    c.bench_function("merge_intervals_1000", |b| {
        b.iter(|| merge_intervals(black_box(&intervals)));
    });
}

criterion_group!(benches, bench_sniff, bench_pdf_parsing, bench_segmentation);
criterion_main!(benches);
