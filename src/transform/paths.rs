//! Output locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where each kind of output goes.
///
/// Every location can be overridden on its own; unset ones are derived from
/// the base data directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputLayout {
    /// Base data directory; defaults to [`default_base_dir`]
    pub base_dir: Option<PathBuf>,
    /// Question figures
    pub questions_figs_dir: Option<PathBuf>,
    /// Non-question figures
    pub non_questions_figs_dir: Option<PathBuf>,
    /// Inside/outside question texts
    pub texts_dir: Option<PathBuf>,
    /// Annotated regions PDF
    pub regions_pdf_path: Option<PathBuf>,
}

impl OutputLayout {
    /// Layout rooted at `base`.
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base.into()),
            ..Self::default()
        }
    }

    /// Resolved base directory.
    pub fn base(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => default_base_dir(),
        }
    }

    fn figs(&self) -> PathBuf {
        self.base().join("figs")
    }

    /// Directory for question figures.
    pub fn questions_figs_dir(&self) -> PathBuf {
        self.questions_figs_dir
            .clone()
            .unwrap_or_else(|| self.figs().join("questoes"))
    }

    /// Directory for non-question figures.
    pub fn non_questions_figs_dir(&self) -> PathBuf {
        self.non_questions_figs_dir
            .clone()
            .unwrap_or_else(|| self.figs().join("fora_questoes"))
    }

    /// Directory for question texts.
    pub fn texts_dir(&self) -> PathBuf {
        self.texts_dir
            .clone()
            .unwrap_or_else(|| self.figs().join("textos_questoes"))
    }

    /// Path of the annotated regions PDF.
    pub fn regions_pdf_path(&self) -> PathBuf {
        self.regions_pdf_path
            .clone()
            .unwrap_or_else(|| self.figs().join("questoes_regioes.pdf"))
    }
}

/// `data/vestibular` under the working directory, or next to it when the
/// working directory is a `notebooks` folder.
pub fn default_base_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    base_dir_from(&cwd)
}

/// Base data directory as seen from `cwd`.
pub fn base_dir_from(cwd: &Path) -> PathBuf {
    let root = if cwd.file_name().is_some_and(|n| n == "notebooks") {
        cwd.parent().unwrap_or(cwd)
    } else {
        cwd
    };
    root.join("data").join("vestibular")
}
