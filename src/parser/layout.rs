//! Layout analysis for exam pages.
//!
//! Interprets page content streams into positioned text spans, then groups
//! spans into lines and lines into blocks. Output geometry is in top-down
//! page space (see [`crate::model::Rect`]).

use crate::error::Result;
use crate::model::{Page, Rect, TextBlock, TextLine};

use super::backend::{get_number_from_value, PageId, PdfBackend, PdfValue};

/// Average glyph advance as a fraction of the font size, used when the
/// font widths are not consulted.
const AVG_GLYPH_ADVANCE: f32 = 0.5;

/// Ascender / descender as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// A text span with position and size, in PDF user space.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, PDF space, grows upward)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
        }
    }

    /// Centre X coordinate.
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(ops: &[PdfValue]) -> Option<Self> {
        if ops.len() < 6 {
            return None;
        }
        let n: Vec<f32> = ops
            .iter()
            .take(6)
            .map(|v| get_number_from_value(v).unwrap_or(0.0))
            .collect();
        Some(Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    font_name: Vec<u8>,
    font_size: f32,
    leading: f32,
    line_matrix: Matrix,
    matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_name: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            line_matrix: Matrix::IDENTITY,
            matrix: Matrix::IDENTITY,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, text_space_dx: f32) {
        self.matrix = Matrix::translation(text_space_dx, 0.0).then(&self.matrix);
    }
}

/// Layout analyzer for extracting positioned text from PDF pages.
pub struct LayoutAnalyzer<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }

    /// Extract text spans from a page in PDF user space.
    pub fn extract_page_spans(&self, page: PageId) -> Result<Vec<TextSpan>> {
        let content = self.backend.page_content(page)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let ops = self.backend.decode_content(&content)?;

        let mut spans = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => ctm = ctm_stack.pop().unwrap_or(Matrix::IDENTITY),
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.line_matrix = Matrix::IDENTITY;
                    state.matrix = Matrix::IDENTITY;
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let PdfValue::Name(name) = &op.operands[0] {
                            state.font_name = name.clone();
                        }
                        state.font_size = get_number_from_value(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.leading = v;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        state.line_matrix = m;
                        state.matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" if in_text_block => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let text = self.backend.decode_text(page, &state.font_name, bytes);
                        self.show_text(&mut spans, &mut state, &ctm, text, 0.0);
                    }
                }
                "TJ" if in_text_block => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        self.show_array(&mut spans, &mut state, &ctm, page, items);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    if in_text_block {
                        let idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(PdfValue::Str(bytes)) = op.operands.get(idx) {
                            let text = self.backend.decode_text(page, &state.font_name, bytes);
                            self.show_text(&mut spans, &mut state, &ctm, text, 0.0);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// TJ: strings interleaved with kerning adjustments in 1/1000 text units.
    /// Large negative adjustments are word gaps.
    fn show_array(
        &self,
        spans: &mut Vec<TextSpan>,
        state: &mut TextState,
        ctm: &Matrix,
        page: PageId,
        items: &[PdfValue],
    ) {
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        let mut adjust = 0.0f32;
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    combined.push_str(&self.backend.decode_text(page, &state.font_name, bytes));
                }
                other => {
                    if let Some(n) = get_number_from_value(other) {
                        adjust += -n / 1000.0 * state.font_size;
                        if -n > SPACE_THRESHOLD
                            && !combined.is_empty()
                            && !combined.ends_with(char::is_whitespace)
                        {
                            combined.push(' ');
                        }
                    }
                }
            }
        }
        self.show_text(spans, state, ctm, combined, adjust);
    }

    fn show_text(
        &self,
        spans: &mut Vec<TextSpan>,
        state: &mut TextState,
        ctm: &Matrix,
        text: String,
        extra_advance: f32,
    ) {
        let advance = text.chars().count() as f32 * state.font_size * AVG_GLYPH_ADVANCE;
        if !text.trim().is_empty() {
            let m = state.matrix.then(ctm);
            let size = state.font_size * m.vertical_scale();
            let width = advance * m.horizontal_scale();
            spans.push(TextSpan::new(text, m.e, m.f, width, size.max(1.0)));
        }
        state.advance(advance + extra_advance);
    }
}

/// A detected column of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Left boundary X coordinate
    pub left: f32,
    /// Right boundary X coordinate
    pub right: f32,
}

impl Column {
    /// Check if a span belongs to this column (left edge or centre inside).
    pub fn contains_span(&self, span: &TextSpan) -> bool {
        let inside = |x: f32| x >= self.left && x <= self.right;
        inside(span.x) || inside(span.center_x())
    }
}

/// Find a single vertical gutter splitting the spans into two columns.
///
/// Returns one column when no gutter of at least 12pt exists in the middle
/// 70% of the text extent, or when either side would be too narrow or too
/// sparse to be a real column.
pub fn detect_columns(spans: &[TextSpan]) -> Vec<Column> {
    const SLICE: f32 = 3.0;
    const MIN_GUTTER: f32 = 12.0;
    const MIN_COLUMN_WIDTH: f32 = 80.0;

    let min_x = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let max_x = spans
        .iter()
        .map(|s| s.x + s.width)
        .fold(f32::NEG_INFINITY, f32::max);
    if !min_x.is_finite() || !max_x.is_finite() {
        return Vec::new();
    }
    let single = vec![Column {
        left: min_x - 10.0,
        right: max_x + 10.0,
    }];

    let extent = max_x - min_x;
    if extent < 2.0 * MIN_COLUMN_WIDTH + MIN_GUTTER {
        return single;
    }

    let slices = (extent / SLICE) as usize + 1;
    let mut occupancy = vec![0usize; slices];
    for span in spans {
        let start = ((span.x - min_x) / SLICE) as usize;
        let end = (((span.x + span.width) - min_x) / SLICE) as usize;
        for slot in occupancy.iter_mut().take(end.min(slices - 1) + 1).skip(start) {
            *slot += 1;
        }
    }

    // Longest empty run inside the middle band, ties go to the run nearest the centre.
    let (band_start, band_end) = (slices * 15 / 100, slices * 85 / 100);
    let centre = slices as f32 / 2.0;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for i in band_start..=band_end {
        let empty = i < band_end && occupancy[i] == 0;
        match (empty, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let len = i - start;
                let better = match best {
                    None => true,
                    Some((b_start, b_len)) => {
                        let dist = |s: usize, l: usize| (s as f32 + l as f32 / 2.0 - centre).abs();
                        len > b_len || (len == b_len && dist(start, len) < dist(b_start, b_len))
                    }
                };
                if better {
                    best = Some((start, len));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    let Some((gap_start, gap_len)) = best else {
        return single;
    };
    if (gap_len as f32) * SLICE < MIN_GUTTER {
        return single;
    }

    let gutter = min_x + (gap_start as f32 + gap_len as f32 / 2.0) * SLICE;
    if gutter - min_x < MIN_COLUMN_WIDTH || max_x - gutter < MIN_COLUMN_WIDTH {
        return single;
    }

    let left = spans.iter().filter(|s| s.center_x() < gutter).count();
    let right = spans.len() - left;
    let min_spans = (spans.len() / 10).max(2);
    if left < min_spans || right < min_spans {
        return single;
    }

    log::debug!("Two-column layout, gutter at x={:.1}", gutter);
    vec![
        Column {
            left: min_x - 10.0,
            right: gutter,
        },
        Column {
            left: gutter,
            right: max_x + 10.0,
        },
    ]
}

/// Build a page model from spans in PDF user space.
///
/// `page_box` is the visible area `[llx, lly, urx, ury]`; output coordinates
/// are relative to its top-left corner. Lines are ordered column by column, top to bottom
/// within each column.
pub fn build_page(index: usize, page_box: [f32; 4], spans: Vec<TextSpan>) -> Page {
    let [llx, lly, urx, ury] = page_box;
    let mut page = Page::new(index, urx - llx, ury - lly);
    if spans.is_empty() {
        return page;
    }

    let columns = detect_columns(&spans);
    let mut per_column: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len().max(1)];
    for span in spans {
        let idx = columns
            .iter()
            .position(|c| c.contains_span(&span))
            .unwrap_or(0);
        per_column[idx].push(span);
    }

    let to_page = |line: SpanLine| -> TextLine {
        let bbox = Rect::new(
            line.x0 - llx,
            ury - (line.baseline + line.font_size * ASCENT),
            line.x1 - llx,
            ury - (line.baseline - line.font_size * DESCENT),
        );
        TextLine::new(line.text, bbox, line.font_size)
    };

    let mut blocks = Vec::new();
    for column_spans in per_column {
        let lines: Vec<TextLine> = group_spans_into_lines(column_spans)
            .into_iter()
            .map(to_page)
            .filter(|l| !l.text.trim().is_empty())
            .collect();
        blocks.extend(group_lines_into_blocks(lines));
    }

    page.with_blocks(blocks)
}

/// Spans sharing a baseline, still in PDF space.
#[derive(Debug, Clone)]
struct SpanLine {
    text: String,
    baseline: f32,
    x0: f32,
    x1: f32,
    font_size: f32,
}

impl SpanLine {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut text = String::new();
        for (i, span) in spans.iter().enumerate() {
            if i > 0 {
                let prev = &spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let chars = span.text.chars().count().max(1) as f32;
                let avg_char = if span.width > 0.0 {
                    span.width / chars
                } else {
                    span.font_size * AVG_GLYPH_ADVANCE
                };
                // Width estimates can overshoot by up to a glyph, so a letter run
                // meeting a numeral run from another show operation is a word
                // boundary even when the estimated gap is zero ("Questão" "07").
                let script_change = match (prev.text.chars().last(), span.text.chars().next()) {
                    (Some(a), Some(b)) => {
                        (a.is_alphabetic() && b.is_ascii_digit())
                            || (a.is_ascii_digit() && b.is_alphabetic())
                    }
                    _ => false,
                };
                let separated = gap > avg_char * 0.2 || (script_change && gap > -avg_char);
                if separated
                    && !text.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace)
                {
                    text.push(' ');
                }
            }
            text.push_str(&span.text);
        }

        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let font_size = if total_chars > 0 {
            spans
                .iter()
                .map(|s| s.font_size * s.text.len() as f32)
                .sum::<f32>()
                / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(12.0)
        };

        Self {
            text,
            baseline: spans.first().map(|s| s.y).unwrap_or(0.0),
            x0: spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min),
            x1: spans
                .iter()
                .map(|s| s.x + s.width)
                .fold(f32::NEG_INFINITY, f32::max),
            font_size,
        }
    }
}

/// Group one column's spans into lines by baseline, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<SpanLine> {
    // PDF Y grows upward: descending Y is top to bottom.
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(SpanLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(SpanLine::from_spans(current));
    }
    lines
}

/// Group consecutive lines into blocks on large gaps, size or indent changes.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    if lines.is_empty() {
        return Vec::new();
    }

    let pitches: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].bbox.y0 - w[0].bbox.y0).abs())
        .filter(|s| *s > 0.1)
        .collect();
    let avg_pitch = if pitches.is_empty() {
        12.0
    } else {
        pitches.iter().sum::<f32>() / pitches.len() as f32
    };

    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();
    for line in lines {
        if let Some(prev) = current.last() {
            let pitch = (line.bbox.y0 - prev.bbox.y0).abs();
            let breaks = pitch > avg_pitch * 1.5
                || (prev.font_size - line.font_size).abs() > 1.0
                || (prev.bbox.x0 - line.bbox.x0).abs() > 20.0;
            if breaks {
                blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock::from_lines(current));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, width: f32) -> TextSpan {
        TextSpan::new(text, x, y, width, 10.0)
    }

    #[test]
    fn test_matrix_then_applies_translation_after_scale() {
        let scale = Matrix {
            a: 2.0,
            d: 2.0,
            ..Matrix::IDENTITY
        };
        let m = Matrix::translation(10.0, 5.0).then(&scale);
        assert_eq!((m.e, m.f), (20.0, 10.0));
        assert_eq!(m.vertical_scale(), 2.0);
    }

    #[test]
    fn test_spans_on_same_baseline_form_one_line() {
        let lines = group_spans_into_lines(vec![
            span("07", 120.0, 700.0, 10.0),
            span("QUESTÃO", 60.0, 700.5, 45.0),
            span("Texto", 60.0, 680.0, 25.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "QUESTÃO 07");
        assert_eq!(lines[1].text, "Texto");
    }

    #[test]
    fn test_abutting_word_and_numeral_runs_are_separated() {
        // Estimated width of "Questao" overshoots into the numeral's run.
        let lines = group_spans_into_lines(vec![
            TextSpan::new("Questao", 72.0, 700.0, 42.0, 12.0),
            TextSpan::new("07", 113.0, 700.0, 12.0, 12.0),
        ]);
        assert_eq!(lines[0].text, "Questao 07");

        // Letters split across show operations still join.
        let lines = group_spans_into_lines(vec![
            TextSpan::new("Quest", 72.0, 700.0, 30.0, 12.0),
            TextSpan::new("ao", 102.0, 700.0, 12.0, 12.0),
        ]);
        assert_eq!(lines[0].text, "Questao");
    }

    #[test]
    fn test_single_column_for_narrow_text() {
        let spans = vec![span("a", 100.0, 700.0, 50.0), span("b", 100.0, 680.0, 60.0)];
        assert_eq!(detect_columns(&spans).len(), 1);
    }

    #[test]
    fn test_two_columns_detected() {
        let mut spans = Vec::new();
        for i in 0..10 {
            let y = 700.0 - i as f32 * 14.0;
            spans.push(span("esquerda", 40.0, y, 230.0));
            spans.push(span("direita", 320.0, y, 230.0));
        }
        let columns = detect_columns(&spans);
        assert_eq!(columns.len(), 2);
        assert!(columns[0].right > 270.0 && columns[0].right < 320.0);
    }

    #[test]
    fn test_build_page_flips_to_top_down_space() {
        let page = build_page(
            0,
            [0.0, 0.0, 595.0, 842.0],
            vec![span("Questão 1", 50.0, 800.0, 45.0)],
        );
        assert_eq!(page.lines.len(), 1);
        let bbox = page.lines[0].bbox;
        assert!((bbox.y0 - 34.0).abs() < 0.01);
        assert!((bbox.y1 - 44.0).abs() < 0.01);
        assert_eq!(page.rect, Rect::new(0.0, 0.0, 595.0, 842.0));
    }

    #[test]
    fn test_columns_are_read_one_after_another() {
        let mut spans = Vec::new();
        for i in 0..6 {
            let y = 700.0 - i as f32 * 14.0;
            spans.push(span(&format!("L{i}"), 40.0, y, 230.0));
            spans.push(span(&format!("R{i}"), 320.0, y, 230.0));
        }
        let page = build_page(0, [0.0, 0.0, 595.0, 842.0], spans);
        let texts: Vec<&str> = page.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(&texts[..3], &["L0", "L1", "L2"]);
        assert_eq!(texts[6], "R0");
    }

    #[test]
    fn test_large_gap_starts_new_block() {
        let lines = vec![
            TextLine::new("a", Rect::new(50.0, 100.0, 100.0, 110.0), 10.0),
            TextLine::new("b", Rect::new(50.0, 112.0, 100.0, 122.0), 10.0),
            TextLine::new("c", Rect::new(50.0, 124.0, 100.0, 134.0), 10.0),
            TextLine::new("d", Rect::new(50.0, 300.0, 100.0, 310.0), 10.0),
        ];
        let blocks = group_lines_into_blocks(lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "a\nb\nc");
    }
}
