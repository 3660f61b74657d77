//! Question and non-question figure export.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::Result;
use crate::model::{Document, QuestionRects, Rect};
use crate::transform::{
    non_question_intervals_on_page, strip_suffix, PageKind, QuestionPatterns, TransformConfig,
};

use super::raster::{PageCache, Rasterizer};

/// Filename of the `part`-th (0-based) of `parts` figures of a question.
pub fn question_figure_name(number: u32, part: usize, parts: usize) -> String {
    if parts == 1 {
        format!("questao_{number:02}.png")
    } else {
        format!("questao_{number:02}_p{}.png", part + 1)
    }
}

/// Filename of a non-question strip; `page_index` is 0-based.
pub fn non_question_figure_name(page_index: usize, suffix: &str) -> String {
    format!("pagina_{page_index:02}_{suffix}.png")
}

/// Rasterize every question clip into `out_dir`.
///
/// Questions spanning several pages get one numbered part per clip.
pub fn export_question_figures(
    doc: &Document,
    rects: &QuestionRects,
    rasterizer: &dyn Rasterizer,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut cache = PageCache::new(rasterizer, dpi);
    let mut written = Vec::new();

    for (&number, clips) in rects {
        for (part, clip) in clips.iter().enumerate() {
            let page_rect = page_rect(doc, clip.page_index);
            let image = cache.crop(clip.page_index, &clip.rect, &page_rect)?;
            let path = out_dir.join(question_figure_name(number, part, clips.len()));
            image.save_with_format(&path, ImageFormat::Png)?;
            written.push(path);
        }
    }

    log::info!("Saved {} question figures to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Rasterize the parts of each page not covered by any question.
///
/// Strips shorter than `min_non_question_height` are skipped. A page whose
/// only strip is exported is named after its [`PageKind`]; otherwise the
/// name says where on the page the strip sits.
pub fn export_non_question_figures(
    doc: &Document,
    rects: &QuestionRects,
    rasterizer: &dyn Rasterizer,
    out_dir: &Path,
    patterns: &QuestionPatterns,
    config: &TransformConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut cache = PageCache::new(rasterizer, config.dpi);
    let mut written = Vec::new();

    for page in &doc.pages {
        let intervals =
            non_question_intervals_on_page(rects, page.index, &page.rect, config.gap_tolerance);
        let kind = PageKind::of(page, patterns, config);

        for (i, &(y0, y1)) in intervals.iter().enumerate() {
            if y1 - y0 < config.min_non_question_height {
                continue;
            }
            let clip = Rect::new(page.rect.x0, y0, page.rect.x1, y1);
            let image = cache.crop(page.index, &clip, &page.rect)?;
            let suffix = strip_suffix(i, intervals.len(), kind);
            let path = out_dir.join(non_question_figure_name(page.index, &suffix));
            image.save_with_format(&path, ImageFormat::Png)?;
            written.push(path);
        }
    }

    log::info!("Saved {} non-question figures to {}", written.len(), out_dir.display());
    Ok(written)
}

fn page_rect(doc: &Document, index: usize) -> Rect {
    doc.page(index).map(|p| p.rect).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_figure_names() {
        assert_eq!(question_figure_name(7, 0, 1), "questao_07.png");
        assert_eq!(question_figure_name(12, 1, 3), "questao_12_p2.png");
    }

    #[test]
    fn test_non_question_figure_name() {
        assert_eq!(non_question_figure_name(0, "rodape"), "pagina_00_rodape.png");
        assert_eq!(
            non_question_figure_name(11, "entre_questoes_2"),
            "pagina_11_entre_questoes_2.png"
        );
    }
}
