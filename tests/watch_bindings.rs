use std::error::Error;
use std::fs;

use assetpipe::watch::{build_watch_bindings, WatchBinding};
use assetpipe::AssetpipeError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn binding_matches_its_pattern_and_nothing_else() -> TestResult {
    let binding = WatchBinding::new("notes", "*.txt", &[])?;

    assert_eq!(binding.task(), "notes");
    assert!(binding.matches("a.txt"));
    assert!(!binding.matches("b.csv"));
    Ok(())
}

#[test]
fn recursive_glob_matches_nested_paths() -> TestResult {
    let binding = WatchBinding::new("scripts", "assets/js/**/*.js", &[])?;

    assert!(binding.matches("assets/js/app.js"));
    assert!(binding.matches("assets/js/_lib/angular.js"));
    assert!(!binding.matches("assets/css/base.css"));
    Ok(())
}

#[test]
fn default_excludes_mask_matching_paths() -> TestResult {
    let excludes = vec!["**/*.tmp".to_string(), "**/*~".to_string()];
    let binding = WatchBinding::new("styles", "assets/**/*", &excludes)?;

    assert!(binding.matches("assets/css/base.css"));
    assert!(!binding.matches("assets/css/base.css.tmp"));
    assert!(!binding.matches("assets/css/base.css~"));
    Ok(())
}

#[test]
fn one_binding_per_task_watch_pattern() -> TestResult {
    let cfg: assetpipe::config::ConfigFile = toml::from_str(
        r#"
        [default]
        exclude = ["**/*~"]

        [task.scripts]
        watch = ["assets/js/**/*.js", "vendor/**/*.js"]

        [task.styles]
        watch = ["assets/css/**/*"]
        "#,
    )?;

    let bindings = build_watch_bindings(&cfg)?;
    assert_eq!(bindings.len(), 3);

    let scripts: Vec<_> = bindings.iter().filter(|b| b.task() == "scripts").collect();
    assert_eq!(scripts.len(), 2);
    Ok(())
}

#[test]
fn static_root_resolves_existing_directories() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("assets/js"))?;

    let binding = WatchBinding::new("scripts", "assets/js/**/*.js", &[])?;
    let root = binding.static_root(dir.path())?;

    assert_eq!(root, dir.path().join("assets/js").canonicalize()?);
    Ok(())
}

#[test]
fn missing_watch_root_fails_only_that_binding() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("assets/css"))?;

    let good = WatchBinding::new("styles", "assets/css/**/*", &[])?;
    let bad = WatchBinding::new("scripts", "assets/js/**/*.js", &[])?;

    assert!(good.static_root(dir.path()).is_ok());
    let err = bad.static_root(dir.path()).unwrap_err();
    match err {
        AssetpipeError::Watch { pattern, .. } => assert_eq!(pattern, "assets/js/**/*.js"),
        other => panic!("expected watch error, got: {other}"),
    }
    Ok(())
}
