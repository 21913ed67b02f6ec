//! Integration tests for the generation pipeline
//!
//! These tests drive `GradleProject` + `GenerationOrchestrator` over scratch
//! projects on disk and verify:
//! - Identifier naming, ordering and collision handling
//! - Idempotent regeneration
//! - Warnings for bad config and missing asset roots
//! - Per-module failure isolation and atomic replacement

use assetgen::models::{ModuleStatus, Warning};
use assetgen::services::{AssetFs, DirListing, EntryKind};
use assetgen::{
    ConfigManager, GenerationError, GenerationOrchestrator, GlobalSettings, GradleProject,
    LocalFs, RunOutcome, RunSummary, Trigger,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use tempfile::TempDir;

fn create_project() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn write(root: &Utf8Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn orchestrator() -> GenerationOrchestrator {
    GenerationOrchestrator::new(Arc::new(LocalFs), GlobalSettings::default())
}

fn project(root: &Utf8Path) -> GradleProject {
    GradleProject::new(root, ConfigManager::default())
}

/// Asserts every needle occurs in `haystack`, in the given order
fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        let found = haystack[from..]
            .find(needle)
            .unwrap_or_else(|| panic!("{:?} missing or out of order in:\n{}", needle, haystack));
        from += found + needle.len();
    }
}

#[test]
fn test_parent_qualified_names_in_declaration_order() {
    let (_tmp, root) = create_project();
    write(&root, "settings.gradle.kts", "include(\":app\")\n");
    write(&root, "app/build.gradle.kts", "");
    write(
        &root,
        "app/assetgen.yaml",
        r#"
assets:
  - images/logo.png
  - images/icons/home.png
assetgen:
  namedWithParent: true
  outputDir: lib/generated
  outputFilename: assets
"#,
    );
    write(&root, "app/images/logo.png", "png");
    write(&root, "app/images/icons/home.png", "png");

    let results = orchestrator().generate_all(&project(&root)).unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_generated(), "{}", results[0].message());
    assert_eq!(results[0].identifier_count, 2);

    let content = fs::read_to_string(root.join("app/lib/generated/assets.kt")).unwrap();
    assert_in_order(
        &content,
        &[
            "object Assets {",
            "const val images_logo = \"images/logo.png\"",
            "const val icons_home = \"images/icons/home.png\"",
        ],
    );
}

#[test]
fn test_bare_name_collision_gets_suffix() {
    let (_tmp, root) = create_project();
    write(
        &root,
        "app/assetgen.yaml",
        "assets: [icons/a.png, fonts/a.png]\nassetgen:\n  namedWithParent: false\n",
    );
    write(&root, "app/icons/a.png", "");
    write(&root, "app/fonts/a.png", "");

    orchestrator().generate_all(&project(&root)).unwrap();

    let content =
        fs::read_to_string(root.join("app/src/main/kotlin/generated/assets.kt")).unwrap();
    assert_in_order(
        &content,
        &[
            "const val a = \"icons/a.png\"",
            "const val a2 = \"fonts/a.png\"",
        ],
    );
}

#[test]
fn test_regeneration_is_byte_identical() {
    let (_tmp, root) = create_project();
    write(&root, "app/build.gradle", "");
    write(&root, "app/assets/ui/button-primary.png", "");
    write(&root, "app/assets/sounds/click_01.ogg", "");

    let orchestrator = orchestrator();
    let first = orchestrator.generate_all(&project(&root)).unwrap();
    let artifact = root.join("app/src/main/kotlin/generated/assets.kt");
    let bytes = fs::read(&artifact).unwrap();

    let second = orchestrator.generate_all(&project(&root)).unwrap();

    assert!(first[0].changed);
    assert!(!second[0].changed);
    assert_eq!(fs::read(&artifact).unwrap(), bytes);
}

#[test]
fn test_invalid_split_pattern_falls_back_with_warning() {
    let (_tmp, root) = create_project();
    write(
        &root,
        "app/assetgen.yaml",
        "assets: [img]\nassetgen:\n  filenameSplitPattern: \"[unclosed\"\n  namedWithParent: false\n",
    );
    write(&root, "app/img/big-red_button.png", "");

    let results = orchestrator().generate_all(&project(&root)).unwrap();

    assert!(results[0].is_generated());
    assert!(results[0].warnings.iter().any(|w| matches!(
        w,
        Warning::Config { key, .. } if key == "filenameSplitPattern"
    )));
    let content =
        fs::read_to_string(root.join("app/src/main/kotlin/generated/assets.kt")).unwrap();
    assert!(content.contains("const val big_red_button = \"img/big-red_button.png\""));
}

#[test]
fn test_missing_root_is_a_warning_not_a_failure() {
    let (_tmp, root) = create_project();
    write(&root, "app/assetgen.yaml", "assets: [missing/, images/]\n");
    write(&root, "app/images/logo.png", "");

    let results = orchestrator().generate_all(&project(&root)).unwrap();

    assert!(results[0].is_generated());
    assert_eq!(results[0].identifier_count, 2);
    assert!(results[0].warnings.iter().any(|w| matches!(
        w,
        Warning::Discovery { path, .. } if path == "missing"
    )));
}

#[test]
fn test_global_settings_apply_below_module_config() {
    let (_tmp, root) = create_project();
    write(&root, "settings.gradle", "include ':app', ':lib'\n");
    write(&root, "app/assetgen.yaml", "assetgen:\n  className: AppAssets\n");
    write(&root, "app/assets/a.png", "");
    write(&root, "lib/assetgen.yaml", "");
    write(&root, "lib/assets/b.png", "");

    let defaults = GlobalSettings {
        class_name: Some("R".into()),
        package_name: Some("com.example".into()),
        ..GlobalSettings::default()
    };
    let orchestrator = GenerationOrchestrator::new(Arc::new(LocalFs), defaults);
    orchestrator.generate_all(&project(&root)).unwrap();

    let app = fs::read_to_string(root.join("app/src/main/kotlin/generated/assets.kt")).unwrap();
    let lib = fs::read_to_string(root.join("lib/src/main/kotlin/generated/assets.kt")).unwrap();
    assert!(app.contains("package com.example"));
    assert!(app.contains("object AppAssets {"));
    assert!(lib.contains("object R {"));
}

#[test]
fn test_failing_module_does_not_stop_others() {
    let (_tmp, root) = create_project();
    write(&root, "settings.gradle.kts", "include(\":broken\", \":app\")\n");
    write(&root, "broken/assetgen.yaml", "");
    write(&root, "broken/assets/a.png", "");
    // A file where the output directory should be
    write(&root, "broken/src", "not a directory");
    write(&root, "app/assetgen.yaml", "");
    write(&root, "app/assets/b.png", "");

    let results = orchestrator().generate_all(&project(&root)).unwrap();

    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0].status,
        ModuleStatus::Failed(GenerationError::Emission { .. })
    ));
    assert!(results[1].is_generated());
    assert!(root.join("app/src/main/kotlin/generated/assets.kt").exists());

    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.outcome, RunOutcome::PartialSuccess);
    assert!(summary.notification.contains("broken"));
}

/// Local filesystem whose renames always fail
struct RenameFails;

impl AssetFs for RenameFails {
    fn kind(&self, path: &Utf8Path) -> Option<EntryKind> {
        LocalFs.kind(path)
    }

    fn list_dir(&self, path: &Utf8Path) -> io::Result<DirListing> {
        LocalFs.list_dir(path)
    }

    fn canonicalize(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        LocalFs.canonicalize(path)
    }

    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        LocalFs.read_to_string(path)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        LocalFs.create_dir_all(path)
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        LocalFs.write(path, contents)
    }

    fn rename(&self, _from: &Utf8Path, _to: &Utf8Path) -> io::Result<()> {
        Err(io::Error::other("simulated crash during replace"))
    }

    fn remove_file(&self, path: &Utf8Path) -> io::Result<()> {
        LocalFs.remove_file(path)
    }
}

#[test]
fn test_failed_replace_leaves_previous_artifact() {
    let (_tmp, root) = create_project();
    write(&root, "app/assetgen.yaml", "");
    write(&root, "app/assets/a.png", "");

    orchestrator().generate_all(&project(&root)).unwrap();
    let artifact = root.join("app/src/main/kotlin/generated/assets.kt");
    let before = fs::read_to_string(&artifact).unwrap();

    write(&root, "app/assets/b.png", "");
    let failing = GenerationOrchestrator::new(Arc::new(RenameFails), GlobalSettings::default());
    let results = failing.generate_all(&project(&root)).unwrap();

    assert!(results[0].is_failed());
    assert_eq!(fs::read_to_string(&artifact).unwrap(), before);
    assert!(!root.join("app/src/main/kotlin/generated/.assets.kt.tmp").exists());
}

#[test]
fn test_no_eligible_modules() {
    let (_tmp, root) = create_project();
    write(&root, "build.gradle.kts", "");
    write(&root, "docs/readme.md", "");

    let error = orchestrator().generate_all(&project(&root)).unwrap_err();

    assert!(matches!(error, GenerationError::NoEligibleModules(_)));
    assert_eq!(RunSummary::from_error(&error).outcome, RunOutcome::Failure);
}

#[test]
fn test_automatic_trigger_skips_opted_out_modules() {
    let (_tmp, root) = create_project();
    write(&root, "settings.gradle.kts", "include(\":app\", \":lib\")\n");
    write(&root, "app/assetgen.yaml", "assetgen:\n  autoDetection: false\n");
    write(&root, "app/assets/a.png", "");
    write(&root, "lib/assetgen.yaml", "");
    write(&root, "lib/assets/b.png", "");

    let results = orchestrator()
        .with_trigger(Trigger::Automatic)
        .generate_all(&project(&root))
        .unwrap();

    assert!(matches!(results[0].status, ModuleStatus::Skipped(_)));
    assert!(results[1].is_generated());
    assert!(!root.join("app/src").exists());
    assert_eq!(RunSummary::from_results(&results).outcome, RunOutcome::Success);
}

#[tokio::test]
async fn test_parallel_generation_matches_sequential() {
    let (_tmp, root) = create_project();
    let modules = ["mod_e", "mod_b", "mod_d", "mod_a", "mod_c"];
    let includes: Vec<String> = modules.iter().map(|m| format!("\":{}\"", m)).collect();
    write(
        &root,
        "settings.gradle.kts",
        &format!("include({})\n", includes.join(", ")),
    );
    for module in modules {
        write(&root, &format!("{}/assetgen.yaml", module), "");
        write(&root, &format!("{}/assets/{}-icon.png", module, module), "");
    }

    let parallel = Arc::new(orchestrator())
        .generate_all_parallel(&project(&root), 4)
        .await
        .unwrap();
    let order: Vec<&str> = parallel.iter().map(|r| r.module.as_str()).collect();
    assert_eq!(order, modules);
    assert!(parallel.iter().all(|r| r.is_generated()));

    let sequential = orchestrator().generate_all(&project(&root)).unwrap();
    assert!(sequential.iter().all(|r| !r.changed));
}
