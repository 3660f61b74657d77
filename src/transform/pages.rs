//! Page classification used to name non-question figures.

use serde::Serialize;

use crate::model::Page;

use super::config::TransformConfig;
use super::patterns::{fold_diacritics, QuestionPatterns};

/// The single label a page gets, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Text mentions a numbered question
    Question,
    /// Short page that says "rascunho"
    Draft,
    /// Essay or instruction page
    Essay,
    /// None of the above
    Generic,
}

impl PageKind {
    /// Classify `page`.
    pub fn of(page: &Page, patterns: &QuestionPatterns, config: &TransformConfig) -> Self {
        if page_has_question(page, patterns) {
            PageKind::Question
        } else if is_draft_page(page, config) {
            PageKind::Draft
        } else if is_essay_page(page, patterns, config) {
            PageKind::Essay
        } else {
            PageKind::Generic
        }
    }

    /// Filename suffix for a page whose only non-question strip is exported.
    pub fn single_strip_suffix(self) -> &'static str {
        match self {
            PageKind::Draft => "rascunho",
            PageKind::Essay => "redacao",
            PageKind::Question | PageKind::Generic => "instrucoes_ou_texto_base",
        }
    }
}

/// Whether a numbered question is mentioned anywhere on the page.
pub fn page_has_question(page: &Page, patterns: &QuestionPatterns) -> bool {
    patterns.mentions_question(&page.text())
}

/// A scratch page: says "rascunho" and carries little else.
pub fn is_draft_page(page: &Page, config: &TransformConfig) -> bool {
    let text = page.stripped_text();
    text.to_lowercase().contains("rascunho")
        && text.chars().count() < config.draft_page_max_text_len
}

/// An essay or instruction page.
///
/// Pages mentioning "redação" qualify, and so does any page that never says
/// "questão". The latter also catches blank and administrative pages.
pub fn is_essay_page(page: &Page, patterns: &QuestionPatterns, config: &TransformConfig) -> bool {
    if page_has_question(page, patterns) || is_draft_page(page, config) {
        return false;
    }
    let text = fold_diacritics(&page.text()).to_lowercase();
    if text.contains("redacao") {
        return true;
    }
    !text.contains("questao")
}

/// Filename suffix for the `i`-th of `count` non-question strips on a page.
pub fn strip_suffix(i: usize, count: usize, kind: PageKind) -> String {
    if count == 1 {
        kind.single_strip_suffix().to_string()
    } else if i == 0 {
        "topo_instrucoes".to_string()
    } else if i + 1 == count {
        "rodape".to_string()
    } else {
        format!("entre_questoes_{i}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rect, TextLine};

    fn page(lines: &[&str]) -> Page {
        Page::a4(0).with_lines(
            lines
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let y = 50.0 + i as f32 * 14.0;
                    TextLine::new(*t, Rect::new(40.0, y, 500.0, y + 12.0), 11.0)
                })
                .collect(),
        )
    }

    fn classify(p: &Page) -> PageKind {
        PageKind::of(p, &QuestionPatterns::new().unwrap(), &TransformConfig::default())
    }

    #[test]
    fn test_question_page() {
        assert_eq!(classify(&page(&["QUESTÃO 12", "Calcule a força"])), PageKind::Question);
    }

    #[test]
    fn test_draft_page() {
        let p = page(&["RASCUNHO"]);
        assert!(is_draft_page(&p, &TransformConfig::default()));
        assert_eq!(classify(&p), PageKind::Draft);

        let long = "texto ".repeat(60);
        assert!(!is_draft_page(&page(&["Rascunho", &long]), &TransformConfig::default()));
    }

    #[test]
    fn test_essay_page() {
        assert_eq!(classify(&page(&["PROPOSTA DE REDAÇÃO", "Leia os textos"])), PageKind::Essay);
        // No question reference at all, including blank pages
        assert_eq!(classify(&page(&[])), PageKind::Essay);
        assert_eq!(classify(&page(&["Instruções gerais"])), PageKind::Essay);
    }

    #[test]
    fn test_essay_keywords_match_decomposed_text() {
        let p = QuestionPatterns::new().unwrap();
        let config = TransformConfig::default();
        // Combining tilde and cedilla, as some generators emit them
        let essay = page(&["Proposta de reda\u{0063}\u{0327}a\u{0303}o", "Leia os textos."]);
        assert!(is_essay_page(&essay, &p, &config));
        let mentions = page(&["Leia com atenção cada questa\u{0303}o antes de responder."]);
        assert!(!is_essay_page(&mentions, &p, &config));
    }

    #[test]
    fn test_generic_page() {
        let p = page(&["As questões a seguir referem-se ao texto", "questão sem número"]);
        assert_eq!(classify(&p), PageKind::Generic);
    }

    #[test]
    fn test_labels_are_exclusive() {
        let patterns = QuestionPatterns::new().unwrap();
        let config = TransformConfig::default();
        for lines in [
            vec!["QUESTÃO 1"],
            vec!["rascunho"],
            vec!["redação"],
            vec!["questão"],
            vec![],
            vec!["Questão 3", "rascunho"],
        ] {
            let p = page(&lines);
            let flags = [
                page_has_question(&p, &patterns),
                is_draft_page(&p, &config) && !page_has_question(&p, &patterns),
                is_essay_page(&p, &patterns, &config),
            ];
            assert!(flags.iter().filter(|f| **f).count() <= 1, "{lines:?}");
        }
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix(0, 1, PageKind::Draft), "rascunho");
        assert_eq!(strip_suffix(0, 1, PageKind::Essay), "redacao");
        assert_eq!(strip_suffix(0, 1, PageKind::Question), "instrucoes_ou_texto_base");
        assert_eq!(strip_suffix(0, 3, PageKind::Essay), "topo_instrucoes");
        assert_eq!(strip_suffix(1, 3, PageKind::Essay), "entre_questoes_1");
        assert_eq!(strip_suffix(2, 3, PageKind::Essay), "rodape");
    }
}
