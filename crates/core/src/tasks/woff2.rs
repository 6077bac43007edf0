use std::path::PathBuf;

use anyhow::{Context, Result};
use galfont_font_woff2::convert_to_woff2;

use crate::{
    History, Reporter,
    io::{file_name, kib, write_protected},
    reporter::Progress,
    tasks::read_quadratic,
};

#[derive(Debug, Clone)]
pub struct Woff2Config {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Woff2Output {
    pub path: PathBuf,
    pub original_size: usize,
    pub woff2_size: usize,
}

impl Woff2Output {
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.woff2_size as f64 / self.original_size as f64) * 100.0
    }
}

/// Compresses a font to WOFF2, converting CFF outlines to glyf first.
pub fn convert_woff2(
    config: &Woff2Config,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<Woff2Output> {
    let mut progress = Progress::new(reporter);
    progress.log(format!("Converting {} to WOFF2", file_name(&config.source)));
    progress.set(10);

    let data = read_quadratic(&config.source, "source font", &mut progress)?;
    progress.set(50);

    let woff2 = convert_to_woff2(&data)
        .with_context(|| format!("Failed to compress {}", config.source.display()))?;
    write_protected(history, "woff2", &config.output, &woff2, &file_name(&config.source))?;

    let output = Woff2Output {
        path: config.output.clone(),
        original_size: data.len(),
        woff2_size: woff2.len(),
    };
    progress.log(format!(
        "Saved {} ({:.1} KB -> {:.1} KB, {:.1}% smaller)",
        config.output.display(),
        kib(output.original_size),
        kib(output.woff2_size),
        output.reduction_percent()
    ));
    progress.finish();
    Ok(output)
}
