//! Question text files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::transform::QuestionTexts;

/// Write `questao_NN_dentro.txt` for every question and
/// `questao_NN_fora.txt` for those with non-empty outside text.
pub fn save_question_text_files(
    inside: &QuestionTexts,
    outside: &QuestionTexts,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    for (number, text) in inside {
        let path = out_dir.join(format!("questao_{number:02}_dentro.txt"));
        fs::write(&path, text)?;
        written.push(path);

        if let Some(context) = outside.get(number).filter(|t| !t.is_empty()) {
            let path = out_dir.join(format!("questao_{number:02}_fora.txt"));
            fs::write(&path, context)?;
            written.push(path);
        }
    }

    log::info!("Saved {} text files to {}", written.len(), out_dir.display());
    Ok(written)
}
