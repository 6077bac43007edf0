//! CLI definitions and command dispatch.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use galfont_core::{
    AtlasConfig, BackupHistory, BuildConfig, BuildMode, CharsetCache, CleanConfig, CodePage,
    FallbackScanConfig, FixConfig, History, LegacyAtlasConfig, LogReporter, MapConfig, MapOutcome,
    NormalizeConfig, NullHistory, Reporter, SubsetConfig, TweakWidthConfig, Woff2Config,
    build_font, clean_font, config, convert_woff2, fallback_scan, fix_geometry, generate_atlas,
    generate_legacy_atlas, generate_mapping, normalize_font, subset_font, tweak_width,
};

#[derive(Parser)]
#[command(name = "galfont")]
#[command(about = "Remap, repair, subset and rasterize fonts for legacy game engines")]
pub struct Cli {
    /// Directory for undo backups (defaults to the system temp dir)
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    /// Do not back up overwritten outputs
    #[arg(long, global = true)]
    pub no_history: bool,

    /// Send task output to the log instead of stdout
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Proxies show the glyphs of the characters they replace
    Forward,
    /// Mapped characters show the glyphs of their proxies
    Reverse,
    /// Only rewrite names and code page bits
    Disguise,
    /// Traditional to simplified glyph aliasing
    T2s,
    /// Simplified to traditional glyph aliasing
    S2t,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Forward => BuildMode::Forward,
            ModeArg::Reverse => BuildMode::Reverse,
            ModeArg::Disguise => BuildMode::DisguiseOnly,
            ModeArg::T2s => BuildMode::TraditionalToSimplified,
            ModeArg::S2t => BuildMode::SimplifiedToTraditional,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Allocate proxy characters for a corpus and rewrite it
    Map {
        corpus_dir: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[arg(short, long, default_value = "mapping.json")]
        mapping: PathBuf,
        #[arg(long, default_value = "txt;json")]
        extensions: String,
        #[arg(long, default_value = "cp932")]
        code_page: CodePage,
        /// Only use proxies (and keep characters) present in this font
        #[arg(long)]
        reference_font: Option<PathBuf>,
    },
    /// Rebuild a font's character map, names and code page bits
    Build {
        source: PathBuf,
        #[arg(long, value_enum)]
        mode: ModeArg,
        #[arg(long)]
        mapping: Option<PathBuf>,
        #[arg(long)]
        fallback: Option<PathBuf>,
        /// Character conversion table for t2s and s2t
        #[arg(long)]
        conversion_table: Option<PathBuf>,
        #[arg(long, default_value = "game.ttf")]
        file_name: String,
        #[arg(long, default_value = config::DEFAULT_FAMILY_NAME)]
        family: String,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Keep only the glyphs a corpus and mapping need
    Subset {
        source: PathBuf,
        output: PathBuf,
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        mapping: Option<PathBuf>,
        #[arg(long, default_value = "txt;json")]
        extensions: String,
    },
    /// Scale outlines and set vertical metrics
    Fix {
        source: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        scale_x: f64,
        #[arg(long, default_value_t = 1.0)]
        scale_y: f64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        spacing: i32,
        #[arg(long, allow_hyphen_values = true)]
        ascent: i16,
        #[arg(long, allow_hyphen_values = true)]
        descent: i16,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        line_gap: i16,
    },
    /// Scale glyph widths and add spacing
    TweakWidth {
        source: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        spacing: i32,
        #[arg(long)]
        file_name: String,
    },
    /// Remove tables (NAME_DETAILED trims names, HINTING strips hinting)
    Clean {
        source: PathBuf,
        output: PathBuf,
        #[arg(required = true)]
        tables: Vec<String>,
    },
    /// Convert CFF outlines to TrueType outlines
    Normalize { source: PathBuf, output: PathBuf },
    /// Compress a font to WOFF2 for web use
    Woff2 { source: PathBuf, output: PathBuf },
    /// Pack glyphs into a texture with a BMFont descriptor
    Atlas {
        font: PathBuf,
        /// The .fnt descriptor; the texture is written next to it
        output: PathBuf,
        #[arg(long, conflicts_with = "chars_file")]
        chars: Option<String>,
        #[arg(long)]
        chars_file: Option<PathBuf>,
        #[arg(long, default_value_t = config::DEFAULT_TEXTURE_SIZE)]
        texture_size: u32,
        #[arg(long, default_value_t = config::DEFAULT_ATLAS_FONT_SIZE)]
        font_size: u32,
    },
    /// Draw the CP932 set into a TGA grid with a binary index
    LegacyAtlas {
        font: PathBuf,
        folder: PathBuf,
        #[arg(long, default_value = "font")]
        stem: String,
        #[arg(long, default_value_t = config::DEFAULT_LEGACY_FONT_SIZE)]
        font_size: u32,
        #[arg(long, default_value_t = config::DEFAULT_LEGACY_IMAGE_SIZE.0)]
        width: u32,
        #[arg(long, default_value_t = config::DEFAULT_LEGACY_IMAGE_SIZE.1)]
        height: u32,
        #[arg(long)]
        cell_width: Option<u32>,
        #[arg(long)]
        cell_height: Option<u32>,
        #[arg(long, default_value_t = config::DEFAULT_LEGACY_SPACING)]
        spacing_x: u32,
        #[arg(long, default_value_t = config::DEFAULT_LEGACY_SPACING)]
        spacing_y: u32,
        #[arg(long, default_value = "")]
        engine_name: String,
        #[arg(long, default_value = "")]
        engine_font_path: String,
    },
    /// Rank fallback fonts by how many missing corpus characters they cover
    FallbackScan {
        primary: PathBuf,
        fallback_dir: PathBuf,
        corpus_dir: PathBuf,
    },
    /// Revert the latest recorded file change
    Undo,
    /// Re-apply the latest undone file change
    Redo,
}

/// Prints task log lines to stdout.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn progress(&mut self, percent: u8) {
        debug!("{percent}%");
    }

    fn log(&mut self, message: &str) {
        println!("{message}");
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut history: Box<dyn History> = match (self.no_history, &self.history_dir) {
            (true, _) => Box::new(NullHistory),
            (false, Some(dir)) => Box::new(BackupHistory::new(dir, config::HISTORY_LIMIT)?),
            (false, None) => Box::new(BackupHistory::in_temp_dir()?),
        };
        let mut reporter: Box<dyn Reporter> = if self.quiet {
            Box::new(LogReporter)
        } else {
            Box::new(ConsoleReporter)
        };
        self.command.run(reporter.as_mut(), history.as_mut())
    }
}

impl Commands {
    pub fn run(self, reporter: &mut dyn Reporter, history: &mut dyn History) -> Result<()> {
        match self {
            Commands::Map {
                corpus_dir,
                output_dir,
                mapping,
                extensions,
                code_page,
                reference_font,
            } => {
                let config = MapConfig {
                    extensions,
                    code_page,
                    reference_font,
                    ..MapConfig::new(corpus_dir, output_dir, mapping)
                };
                match generate_mapping(&config, reporter)? {
                    MapOutcome::NothingToMap { safe } => {
                        println!("Nothing to map ({safe} characters already representable)")
                    }
                    MapOutcome::Mapped {
                        mapping_path,
                        pairs,
                        files_written,
                    } => println!(
                        "Mapped {pairs} characters into {} and rewrote {files_written} files",
                        mapping_path.display()
                    ),
                }
            }
            Commands::Build {
                source,
                mode,
                mapping,
                fallback,
                conversion_table,
                file_name,
                family,
                output_dir,
            } => {
                let config = BuildConfig {
                    mapping,
                    fallback,
                    conversion_table,
                    family_name: family,
                    output_dir,
                    ..BuildConfig::new(source, mode.into(), file_name)
                };
                let output = build_font(&config, reporter, history)?;
                println!("Built {}", output.path.display());
            }
            Commands::Subset {
                source,
                output,
                corpus,
                mapping,
                extensions,
            } => {
                let config = SubsetConfig {
                    corpus_dir: corpus,
                    mapping,
                    extensions,
                    ..SubsetConfig::new(source, output)
                };
                subset_font(&config, reporter, history)?;
            }
            Commands::Fix {
                source,
                output,
                scale_x,
                scale_y,
                spacing,
                ascent,
                descent,
                line_gap,
            } => {
                let config = FixConfig {
                    source,
                    output,
                    scale_x,
                    scale_y,
                    spacing,
                    ascent,
                    descent,
                    line_gap,
                };
                fix_geometry(&config, reporter, history)?;
            }
            Commands::TweakWidth {
                source,
                scale,
                spacing,
                file_name,
            } => {
                let config = TweakWidthConfig {
                    source,
                    scale,
                    spacing,
                    file_name,
                };
                tweak_width(&config, reporter, history)?;
            }
            Commands::Clean {
                source,
                output,
                tables,
            } => {
                clean_font(
                    &CleanConfig {
                        source,
                        output,
                        tables,
                    },
                    reporter,
                    history,
                )?;
            }
            Commands::Normalize { source, output } => {
                normalize_font(&NormalizeConfig { source, output }, reporter, history)?;
            }
            Commands::Woff2 { source, output } => {
                convert_woff2(&Woff2Config { source, output }, reporter, history)?;
            }
            Commands::Atlas {
                font,
                output,
                chars,
                chars_file,
                texture_size,
                font_size,
            } => {
                let characters = match (chars, chars_file) {
                    (Some(chars), _) => chars,
                    (None, Some(path)) => fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                    (None, None) => bail!("Either --chars or --chars-file is required"),
                };
                let config = AtlasConfig {
                    texture_size,
                    font_size,
                    ..AtlasConfig::new(font, characters, output)
                };
                generate_atlas(&config, reporter)?;
            }
            Commands::LegacyAtlas {
                font,
                folder,
                stem,
                font_size,
                width,
                height,
                cell_width,
                cell_height,
                spacing_x,
                spacing_y,
                engine_name,
                engine_font_path,
            } => {
                let config = LegacyAtlasConfig {
                    font_size,
                    image_width: width,
                    image_height: height,
                    cell_width: cell_width.unwrap_or(font_size),
                    cell_height: cell_height.unwrap_or(font_size),
                    spacing_x,
                    spacing_y,
                    engine_name,
                    engine_font_path,
                    ..LegacyAtlasConfig::new(font, folder, stem)
                };
                let output = generate_legacy_atlas(&config, reporter)?;
                println!(
                    "Wrote {} glyphs to {}{}",
                    output.glyphs,
                    output.texture.display(),
                    if output.truncated { " (truncated)" } else { "" }
                );
            }
            Commands::FallbackScan {
                primary,
                fallback_dir,
                corpus_dir,
            } => {
                let scan = FallbackScanConfig {
                    primary,
                    fallback_dir,
                    corpus_dir,
                };
                let mut cache = CharsetCache::new(
                    config::CHARSET_CACHE_CAPACITY,
                    config::CHARSET_CACHE_MAX_AGE,
                );
                let output = fallback_scan(&scan, reporter, &mut cache)?;
                for (name, chars) in &output.contributions {
                    println!("{name}: {}", chars.iter().collect::<String>());
                }
                if !output.report.unresolved.is_empty() {
                    println!(
                        "unresolved: {}",
                        output.report.unresolved.iter().collect::<String>()
                    );
                }
            }
            Commands::Undo => match history.undo()? {
                Some(entry) => println!("Undid {} on {}", entry.action, entry.path.display()),
                None => println!("Nothing to undo"),
            },
            Commands::Redo => match history.redo()? {
                Some(entry) => println!("Redid {} on {}", entry.action, entry.path.display()),
                None => println!("Nothing to redo"),
            },
        }
        Ok(())
    }
}
