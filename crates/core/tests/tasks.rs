use std::{collections::BTreeMap, fs, path::Path};

use galfont_core::{
    BackupHistory, BuildConfig, BuildMode, CharsetCache, CleanConfig, FallbackScanConfig,
    FixConfig, History, MapConfig, MapOutcome, MemoryReporter, NullHistory, SubsetConfig,
    TaskError, TweakWidthConfig, Woff2Config, build_font, clean_font, convert_woff2,
    fallback_scan, fix_geometry, generate_mapping, subset_font, tweak_width,
};
use galfont_font_ops::{FontTables, testing::TestFont};
use read_fonts::{FontRef, TableProvider, types::Tag};

fn names(data: &[u8]) -> BTreeMap<u16, String> {
    let font = FontRef::new(data).unwrap();
    let name = font.name().unwrap();
    name.name_record()
        .iter()
        .map(|r| {
            (
                r.name_id().to_u16(),
                r.string(name.string_data()).unwrap().chars().collect(),
            )
        })
        .collect()
}

fn write_font(dir: &Path, name: &str, font: TestFont) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, font.build()).unwrap();
    path
}

#[test]
fn test_map_task_writes_mapping_and_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(corpus.join("sub")).unwrap();
    fs::write(corpus.join("sub/a.txt"), "안녕 abc").unwrap();

    let config = MapConfig::new(&corpus, dir.path().join("out"), dir.path().join("map.json"));
    let mut reporter = MemoryReporter::new();
    let outcome = generate_mapping(&config, &mut reporter).unwrap();

    let MapOutcome::Mapped {
        pairs,
        files_written,
        ..
    } = outcome
    else {
        panic!("expected a mapping");
    };
    assert_eq!(pairs, 2);
    assert_eq!(files_written, 1);
    assert!(dir.path().join("map.json").exists());
    let rewritten = fs::read_to_string(dir.path().join("out/sub/a.txt")).unwrap();
    assert!(rewritten.ends_with(" abc"));
    assert!(!rewritten.contains('안'));
    assert_eq!(reporter.progress.last(), Some(&100));
}

#[test]
fn test_map_task_capacity_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("a.txt"), "국한").unwrap();
    let reference = write_font(dir.path(), "ref.ttf", TestFont::new(1000).glyph('亜', 1000));

    let mut config = MapConfig::new(&corpus, dir.path().join("out"), dir.path().join("map.json"));
    config.reference_font = Some(reference);
    assert!(generate_mapping(&config, &mut MemoryReporter::new()).is_err());
    assert!(!dir.path().join("map.json").exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_map_task_nothing_to_map() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "plain ascii").unwrap();
    let config = MapConfig::new(dir.path(), dir.path().join("out"), dir.path().join("map.json"));
    let outcome = generate_mapping(&config, &mut MemoryReporter::new()).unwrap();
    assert!(matches!(outcome, MapOutcome::NothingToMap { .. }));
    assert!(!dir.path().join("map.json").exists());
}

#[test]
fn test_build_forward_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(
        dir.path(),
        "source.ttf",
        TestFont::new(1000).glyphs(['a', 'b'], 500),
    );
    let mapping = dir.path().join("map.json");
    fs::write(&mapping, r#"{"a": "亜"}"#).unwrap();

    let mut config = BuildConfig::new(&source, BuildMode::Forward, "game");
    config.mapping = Some(mapping);
    config.family_name = "Disguised".to_string();
    let mut history = BackupHistory::new(dir.path().join("history"), 5).unwrap();

    let output = build_font(&config, &mut MemoryReporter::new(), &mut history).unwrap();
    assert_eq!(output.path, dir.path().join("game.ttf"));
    assert_eq!(output.report.aliased(), 1);

    let data = fs::read(&output.path).unwrap();
    let cmap = FontTables::new(&data).unwrap().best_cmap();
    assert_eq!(cmap.get(&('亜' as u32)), cmap.get(&('a' as u32)));
    assert_eq!(names(&data).get(&1).map(String::as_str), Some("Disguised"));
    assert!(history.entries().next().unwrap().new_file);

    build_font(&config, &mut MemoryReporter::new(), &mut history).unwrap();
    assert!(!history.entries().next().unwrap().new_file);
    history.undo().unwrap();
    history.undo().unwrap();
    assert!(!output.path.exists());
}

#[test]
fn test_build_requires_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let missing = BuildConfig::new(dir.path().join("nope.ttf"), BuildMode::DisguiseOnly, "x");
    let err = build_font(&missing, &mut MemoryReporter::new(), &mut NullHistory).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TaskError>(),
        Some(TaskError::InputNotFound(_))
    ));

    let source = write_font(dir.path(), "source.ttf", TestFont::new(1000).glyph('a', 500));
    let no_mapping = BuildConfig::new(&source, BuildMode::Reverse, "x");
    assert!(build_font(&no_mapping, &mut MemoryReporter::new(), &mut NullHistory).is_err());
    assert!(!dir.path().join("x.ttf").exists());
}

#[test]
fn test_build_reports_missing_characters() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(dir.path(), "source.ttf", TestFont::new(1000).glyph('a', 500));
    let mapping = dir.path().join("map.json");
    fs::write(&mapping, r#"{"한": "亜"}"#).unwrap();

    let mut config = BuildConfig::new(&source, BuildMode::Forward, "out.ttf");
    config.mapping = Some(mapping);
    let mut reporter = MemoryReporter::new();
    let output = build_font(&config, &mut reporter, &mut NullHistory).unwrap();
    assert!(output.report.missing.contains(&'한'));
    assert!(reporter.contains("have no glyph"));
}

#[test]
fn test_tweak_width_renames_family() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(dir.path(), "source.ttf", TestFont::new(1000).glyph('a', 500));
    let config = TweakWidthConfig {
        source,
        scale: 1.0,
        spacing: 5,
        file_name: "narrow.ttf".to_string(),
    };
    let mut reporter = MemoryReporter::new();
    let output = tweak_width(&config, &mut reporter, &mut NullHistory).unwrap();
    assert!(reporter.contains("hardly visible"));

    let data = fs::read(&output.path).unwrap();
    let names = names(&data);
    assert_eq!(names.get(&1).map(String::as_str), Some("Test Sans Condensed"));
    assert_eq!(
        names.get(&4).map(String::as_str),
        Some("Test Sans Regular Condensed")
    );
    assert_eq!(names.get(&6).map(String::as_str), Some("TestSans-Regular"));

    let tables = FontTables::new(&data).unwrap();
    assert_eq!(tables.h_metric(read_fonts::types::GlyphId::new(1)).unwrap().0, 505);
}

#[test]
fn test_fix_geometry_sets_vertical_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(dir.path(), "source.ttf", TestFont::new(1000).glyph('a', 500));
    let config = FixConfig {
        source,
        output: dir.path().join("fixed/out.ttf"),
        scale_x: 1.0,
        scale_y: 1.0,
        spacing: 0,
        ascent: 880,
        descent: -120,
        line_gap: 0,
    };
    let output = fix_geometry(&config, &mut MemoryReporter::new(), &mut NullHistory).unwrap();
    let data = fs::read(output.path).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(font.hhea().unwrap().ascender().to_i16(), 880);
    assert_eq!(font.os2().unwrap().us_win_descent(), 120);
}

#[test]
fn test_clean_removes_requested_tables() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(dir.path(), "source.ttf", TestFont::new(1000).glyph('a', 500));
    let config = CleanConfig {
        source,
        output: dir.path().join("clean.ttf"),
        tables: vec!["post".to_string(), "NAME_DETAILED".to_string()],
    };
    let output = clean_font(&config, &mut MemoryReporter::new(), &mut NullHistory).unwrap();
    assert_eq!(output.report.removed, vec![Tag::new(b"post")]);
    assert!(output.report.names_trimmed);

    let data = fs::read(&output.path).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert!(font.table_data(Tag::new(b"post")).is_none());
    assert!(!names(&data).contains_key(&16));
}

#[test]
fn test_subset_task_keeps_corpus_characters() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(
        dir.path(),
        "source.ttf",
        TestFont::new(1000).glyphs('a'..='z', 500),
    );
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("line.txt"), "ac").unwrap();

    let mut config = SubsetConfig::new(&source, dir.path().join("subset.ttf"));
    config.corpus_dir = Some(corpus);
    let output = subset_font(&config, &mut MemoryReporter::new(), &mut NullHistory).unwrap();
    assert_eq!(output.report.kept_characters, 2);
    assert!(output.report.subset_size < output.report.original_size);

    let data = fs::read(&output.path).unwrap();
    let charset = FontTables::new(&data).unwrap().charset();
    assert_eq!(charset.into_iter().collect::<Vec<_>>(), vec!['a' as u32, 'c' as u32]);
}

#[test]
fn test_woff2_task_writes_compressed_font() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_font(
        dir.path(),
        "source.ttf",
        TestFont::new(1000).glyphs('a'..='z', 500),
    );
    let config = Woff2Config {
        source,
        output: dir.path().join("web.woff2"),
    };
    let mut history = BackupHistory::new(dir.path().join("history"), 5).unwrap();

    let output = convert_woff2(&config, &mut MemoryReporter::new(), &mut history).unwrap();
    assert!(output.woff2_size < output.original_size);
    let data = fs::read(&output.path).unwrap();
    assert_eq!(&data[..4], b"wOF2");
    assert_eq!(data.len(), output.woff2_size);
    assert!(history.entries().next().unwrap().new_file);

    history.undo().unwrap();
    assert!(!output.path.exists());
}

#[test]
fn test_fallback_scan_assigns_best_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let primary = write_font(dir.path(), "primary.ttf", TestFont::new(1000).glyph('a', 500));
    let fallbacks = dir.path().join("fallbacks");
    fs::create_dir_all(&fallbacks).unwrap();
    write_font(&fallbacks, "b.ttf", TestFont::new(1000).glyphs(['b', 'c'], 500));
    write_font(&fallbacks, "c.ttf", TestFont::new(1000).glyph('c', 500));
    fs::write(fallbacks.join("broken.ttf"), b"not a font").unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("line.txt"), "abc d\n").unwrap();

    let config = FallbackScanConfig {
        primary,
        fallback_dir: fallbacks,
        corpus_dir: corpus,
    };
    let mut cache = CharsetCache::default();
    let output = fallback_scan(&config, &mut MemoryReporter::new(), &mut cache).unwrap();

    let names: Vec<&str> = output.report.ranking.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["b.ttf", "c.ttf"]);
    assert_eq!(output.contributions.len(), 1);
    assert_eq!(output.contributions.get("b.ttf"), Some(&vec!['b', 'c']));
    assert_eq!(output.report.unresolved.into_iter().collect::<String>(), "d");
}
