//! Tesseract command-line engine.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};
use crate::model::Locale;
use crate::source::RasterImage;

use super::{OcrEngine, OcrLoader, OcrResult};

/// Default executable name.
pub const DEFAULT_TESSERACT: &str = "tesseract";

/// TSV row level for single words.
const WORD_LEVEL: u32 = 5;

/// Loads [`TesseractEngine`]s after checking the language packs exist.
#[derive(Debug, Clone)]
pub struct TesseractLoader {
    program: PathBuf,
}

impl TesseractLoader {
    /// Use the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Installed language packs.
    pub fn list_languages(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg("--list-langs")
            .output()
            .map_err(|e| {
                Error::OcrInit(format!(
                    "failed to run {} (is it installed?): {}",
                    self.program.display(),
                    e
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::OcrInit(format!(
                "{} --list-langs failed: {}",
                self.program.display(),
                stderr.trim()
            )));
        }
        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for TesseractLoader {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT)
    }
}

impl OcrLoader for TesseractLoader {
    fn load(&self, locales: &[Locale]) -> Result<Box<dyn OcrEngine>> {
        let installed = self.list_languages()?;
        let missing: Vec<&str> = locales
            .iter()
            .map(|l| l.code3())
            .filter(|code| !installed.iter().any(|lang| lang == code))
            .collect();
        if !missing.is_empty() {
            return Err(Error::OcrInit(format!(
                "missing language packs: {}",
                missing.join(", ")
            )));
        }

        let languages = locales
            .iter()
            .map(|l| l.code3())
            .collect::<Vec<_>>()
            .join("+");
        Ok(Box::new(TesseractEngine {
            program: self.program.clone(),
            languages,
        }))
    }
}

/// A tesseract invocation bound to a language set.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
    languages: String,
}

impl TesseractEngine {
    /// The `-l` argument, e.g. `heb+eng`.
    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl OcrEngine for TesseractEngine {
    fn read_text(&self, image: &RasterImage) -> Result<Vec<OcrResult>> {
        let mut input = tempfile::Builder::new()
            .prefix("readaloud-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(&image.png)?;
        input.flush()?;

        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .arg("tsv")
            .output()
            .map_err(|e| Error::Ocr(format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }
        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.starts_with("List of available languages"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug)]
struct Paragraph {
    words: Vec<String>,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

/// Group tesseract TSV word rows into paragraph results.
///
/// Paragraphs are keyed by (page, block, paragraph) and come out in that
/// order; words keep their row order.
pub fn parse_tsv(tsv: &str) -> Vec<OcrResult> {
    let mut paragraphs: BTreeMap<(u32, u32, u32), Paragraph> = BTreeMap::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let field = |i: usize| cols[i].trim().parse::<u32>().ok();
        if field(0) != Some(WORD_LEVEL) {
            continue;
        }
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let (Some(left), Some(top), Some(width), Some(height)) =
            (field(6), field(7), field(8), field(9))
        else {
            continue;
        };

        let key = (
            field(1).unwrap_or(0),
            field(2).unwrap_or(0),
            field(3).unwrap_or(0),
        );
        let para = paragraphs.entry(key).or_insert_with(|| Paragraph {
            words: Vec::new(),
            left,
            top,
            right: left + width,
            bottom: top + height,
        });
        para.words.push(text.to_string());
        para.left = para.left.min(left);
        para.top = para.top.min(top);
        para.right = para.right.max(left + width);
        para.bottom = para.bottom.max(top + height);
    }

    paragraphs
        .into_values()
        .map(|p| {
            OcrResult::from_rect(
                p.left as f32,
                p.top as f32,
                (p.right - p.left) as f32,
                (p.bottom - p.top) as f32,
                p.words.join(" "),
            )
        })
        .collect()
}
