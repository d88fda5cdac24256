use std::error::Error;
use std::sync::{Arc, Mutex};

use assetpipe::dag::{TaskAction, TaskRegistry};

type TestResult = Result<(), Box<dyn Error>>;

type Log = Arc<Mutex<Vec<String>>>;

fn logging_action(log: &Log, name: &str) -> TaskAction {
    let log = Arc::clone(log);
    let name = name.to_string();
    Box::new(move || {
        log.lock().unwrap().push(name.clone());
        Ok(())
    })
}

#[test]
fn build_runs_after_clean() -> TestResult {
    let log: Log = Arc::default();

    let mut registry = TaskRegistry::new();
    registry.register("clean", vec![], logging_action(&log, "clean"))?;
    registry.register("build", vec!["clean".into()], logging_action(&log, "build"))?;
    registry.resolve()?;

    let report = registry.run("build")?;

    assert!(report.is_success());
    assert_eq!(*log.lock().unwrap(), vec!["clean", "build"]);
    Ok(())
}

#[test]
fn diamond_runs_shared_prerequisite_once() -> TestResult {
    let log: Log = Arc::default();

    let mut registry = TaskRegistry::new();
    registry.register("assets", vec![], logging_action(&log, "assets"))?;
    registry.register("css", vec!["assets".into()], logging_action(&log, "css"))?;
    registry.register("js", vec!["assets".into()], logging_action(&log, "js"))?;
    registry.register(
        "site",
        vec!["css".into(), "js".into()],
        logging_action(&log, "site"),
    )?;
    registry.resolve()?;

    let report = registry.run("site")?;
    assert!(report.is_success());

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4, "each reachable task runs exactly once");
    assert_eq!(log.first().map(String::as_str), Some("assets"));
    assert_eq!(log.last().map(String::as_str), Some("site"));
    Ok(())
}

#[test]
fn unreachable_tasks_do_not_run() -> TestResult {
    let log: Log = Arc::default();

    let mut registry = TaskRegistry::new();
    registry.register("wanted", vec![], logging_action(&log, "wanted"))?;
    registry.register("other", vec![], logging_action(&log, "other"))?;
    registry.resolve()?;

    registry.run("wanted")?;

    assert_eq!(*log.lock().unwrap(), vec!["wanted"]);
    Ok(())
}

#[test]
fn failed_prerequisite_is_reported_but_run_continues() -> TestResult {
    let log: Log = Arc::default();

    let mut registry = TaskRegistry::new();
    registry.register(
        "broken",
        vec![],
        Box::new(|| Err(anyhow::anyhow!("no such input").into())),
    )?;
    registry.register("site", vec!["broken".into()], logging_action(&log, "site"))?;
    registry.resolve()?;

    let report = registry.run("site")?;

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "broken");
    // Ordering only: the prerequisite completed (with a reported failure)
    // before the dependent ran.
    assert_eq!(report.executed, vec!["broken", "site"]);
    assert_eq!(*log.lock().unwrap(), vec!["site"]);
    Ok(())
}

#[test]
fn aggregate_task_only_pulls_in_prerequisites() -> TestResult {
    let log: Log = Arc::default();

    let mut registry = TaskRegistry::new();
    registry.register("styles", vec![], logging_action(&log, "styles"))?;
    registry.register("scripts", vec![], logging_action(&log, "scripts"))?;
    registry.register_aggregate("default", vec!["styles".into(), "scripts".into()])?;
    registry.resolve()?;

    let report = registry.run("default")?;

    assert!(report.is_success());
    assert_eq!(report.executed.len(), 3);
    let log = log.lock().unwrap();
    assert!(log.contains(&"styles".to_string()));
    assert!(log.contains(&"scripts".to_string()));
    Ok(())
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = TaskRegistry::new();
    registry
        .register("copy", vec![], Box::new(|| Ok(())))
        .unwrap();

    let err = registry
        .register("copy", vec![], Box::new(|| Ok(())))
        .unwrap_err();
    assert!(err.to_string().contains("registered twice"));
}
