//! Page rendering through poppler's `pdftoppm`.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

use super::backend::{PageRasterizer, RasterImage};

/// Default executable name.
pub const DEFAULT_PDFTOPPM: &str = "pdftoppm";

/// Rendering resolution; 72 dpi keeps pixel and point coordinates equal.
pub const NATIVE_DPI: u32 = 72;

/// Renders single pages with the `pdftoppm` command-line tool.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Use the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dpi: NATIVE_DPI,
        }
    }

    /// Render at a different resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Whether the executable can be launched at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("-v").output().is_ok()
    }

    fn args(&self, number: u32) -> Vec<String> {
        vec![
            "-f".to_string(),
            number.to_string(),
            "-l".to_string(),
            number.to_string(),
            "-r".to_string(),
            self.dpi.to_string(),
            "-png".to_string(),
            "-singlefile".to_string(),
        ]
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_PDFTOPPM)
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &[u8], number: u32) -> Result<RasterImage> {
        let mut input = tempfile::Builder::new()
            .prefix("readaloud-")
            .suffix(".pdf")
            .tempfile()?;
        input.write_all(pdf)?;
        input.flush()?;

        let out_dir = tempfile::tempdir()?;
        let out_root = out_dir.path().join("page");

        let output = Command::new(&self.program)
            .args(self.args(number))
            .arg(input.path())
            .arg(&out_root)
            .output()
            .map_err(|e| {
                Error::Rasterize(format!(
                    "failed to run {} (is poppler installed?): {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Rasterize(format!(
                "{} failed on page {}: {}",
                self.program.display(),
                number,
                stderr.trim()
            )));
        }

        let png = std::fs::read(out_root.with_extension("png"))
            .map_err(|e| Error::Rasterize(format!("missing output for page {}: {}", number, e)))?;
        log::debug!("Rendered page {} at {} dpi ({} bytes)", number, self.dpi, png.len());
        RasterImage::from_png(png)
    }
}
