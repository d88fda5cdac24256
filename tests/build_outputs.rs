use std::error::Error;
use std::fs;

use assetpipe::config::ConfigFile;
use assetpipe::dag::registry_from_config;

type TestResult = Result<(), Box<dyn Error>>;

/// Full path from config to files on disk: sources are read glob by glob in
/// declared order, concatenated, and written under `dest`.
#[test]
fn scripts_task_concatenates_in_declared_glob_order() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("assets/js/_lib"))?;
    fs::create_dir_all(root.join("assets/js/_src"))?;
    fs::write(root.join("assets/js/_lib/angular.js"), "lib")?;
    fs::write(root.join("assets/js/_src/widget.js"), "src")?;
    fs::write(root.join("assets/js/app.js"), "app")?;

    let cfg: ConfigFile = toml::from_str(
        r#"
        [task.scripts]
        src = ["assets/js/_lib/**/*.js", "assets/js/_src/**/*.js", "assets/js/app.js"]
        dest = "app/js"
        pipeline = [{ stage = "concat", output = "app.js", separator = ";" }]
        "#,
    )?;

    let registry = registry_from_config(&cfg, root)?;
    let report = registry.run("scripts")?;
    assert!(report.is_success());

    let built = fs::read_to_string(root.join("app/js/app.js"))?;
    assert_eq!(built, "lib;src;app");
    Ok(())
}

#[test]
fn copy_task_preserves_relative_structure() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("assets/svg/icons"))?;
    fs::write(root.join("assets/svg/logo.svg"), "<svg/>")?;
    fs::write(root.join("assets/svg/icons/dot.svg"), "<svg/>")?;

    let cfg: ConfigFile = toml::from_str(
        r#"
        [task.svg]
        src = ["assets/svg/**/*.svg"]
        dest = "app/svg"
        "#,
    )?;

    let registry = registry_from_config(&cfg, root)?;
    assert!(registry.run("svg")?.is_success());

    assert!(root.join("app/svg/logo.svg").is_file());
    assert!(root.join("app/svg/icons/dot.svg").is_file());
    Ok(())
}

#[test]
fn gzip_stage_writes_siblings_for_large_outputs() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("assets/css"))?;
    fs::write(root.join("assets/css/base.css"), "x".repeat(4096))?;
    fs::write(root.join("assets/css/tiny.css"), "y")?;

    let cfg: ConfigFile = toml::from_str(
        r#"
        [task.stylesheets]
        src = ["assets/css/**/*.css"]
        dest = "app/css"
        pipeline = [{ stage = "gzip", threshold = "1kb", level = 9 }]
        "#,
    )?;

    let registry = registry_from_config(&cfg, root)?;
    assert!(registry.run("stylesheets")?.is_success());

    assert!(root.join("app/css/base.css").is_file());
    assert!(root.join("app/css/base.css.gz").is_file());
    assert!(root.join("app/css/tiny.css").is_file());
    assert!(!root.join("app/css/tiny.css.gz").exists());
    Ok(())
}

#[test]
fn prerequisite_outputs_are_visible_to_dependents() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("vendor"))?;
    fs::write(root.join("vendor/angular.js"), "lib")?;
    fs::create_dir_all(root.join("assets/js"))?;
    fs::write(root.join("assets/js/app.js"), "app")?;

    let cfg: ConfigFile = toml::from_str(
        r#"
        [task.copy]
        src = ["vendor/angular.js"]
        dest = "assets/js/_lib"

        [task.scripts]
        src = ["assets/js/_lib/**/*.js", "assets/js/app.js"]
        dest = "app/js"
        after = ["copy"]
        pipeline = [{ stage = "concat", output = "app.js", separator = ";" }]
        "#,
    )?;

    let registry = registry_from_config(&cfg, root)?;
    assert!(registry.run("scripts")?.is_success());

    let built = fs::read_to_string(root.join("app/js/app.js"))?;
    assert_eq!(built, "lib;app");
    Ok(())
}

#[test]
fn missing_source_directory_yields_an_empty_build() -> TestResult {
    let dir = tempfile::tempdir()?;

    // Globs over missing directories simply match nothing; the task still
    // succeeds with zero files, mirroring how glob expansion behaves.
    let cfg: ConfigFile = toml::from_str(
        r#"
        [task.views]
        src = ["app/views/*.html"]
        dest = "app"
        "#,
    )?;

    let registry = registry_from_config(&cfg, dir.path())?;
    let report = registry.run("views")?;
    assert!(report.is_success());
    assert!(!dir.path().join("app").exists());
    Ok(())
}
