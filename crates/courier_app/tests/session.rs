use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use courier_app::platform::app::Session;
use courier_app::platform::commands::{self, ProcessRequest};
use courier_app::platform::shell::{report_changes, run_shell};
use courier_core::{CatalogStatus, SelectableFile, SelectionPolicy, UploadResult};
use courier_engine::{ApiSettings, DirectoryDownloads, EngineHandle};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Option<Duration> = Some(Duration::from_secs(5));

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(courier_logging::initialize_for_tests);
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/get-available-actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "merge", "title": "Merge PDFs", "description": "Join into one document."},
            {"id": "split", "title": "Split PDF", "description": "One file per page."}
        ])))
        .mount(server)
        .await;
}

fn processed(body: &[u8], filename: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header(
            "content-disposition",
            format!("attachment; filename={filename}").as_str(),
        )
        .insert_header("content-type", "application/pdf")
        .set_body_bytes(body.to_vec())
}

fn session_for(server: &MockServer, output: &Path, policy: SelectionPolicy) -> Session {
    let settings = ApiSettings::parse(&server.uri()).unwrap();
    let engine =
        EngineHandle::with_settings(settings, DirectoryDownloads::new(output.to_path_buf()))
            .unwrap();
    Session::new(engine, policy)
}

fn write_inputs(dir: &Path) -> Vec<PathBuf> {
    ["a.pdf", "b.pdf"]
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, format!("%PDF-{name}")).unwrap();
            path
        })
        .collect()
}

fn input_files(paths: &[PathBuf]) -> Vec<SelectableFile> {
    paths
        .iter()
        .map(|p| SelectableFile::from_path(p).unwrap())
        .collect()
}

fn saved_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn posted_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn selected_batch_is_delivered_exactly_once() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF-merged", "out.pdf"))
        .expect(1)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    assert_eq!(session.state().catalog_status(), &CatalogStatus::Loaded);

    session.add_files(input_files(&write_inputs(input.path())));
    session.toggle_action("merge").unwrap();
    session.submit();
    assert!(session.state().is_in_flight());
    assert!(session.wait_for_idle(WAIT));

    match session.state().last_result() {
        Some(UploadResult::Delivered {
            filename, byte_len, ..
        }) => {
            assert_eq!(filename, "out.pdf");
            assert_eq!(*byte_len, 11);
        }
        other => panic!("expected delivery, got {other:?}"),
    }
    assert_eq!(saved_names(output.path()), vec!["out.pdf".to_string()]);
    assert_eq!(
        fs::read(output.path().join("out.pdf")).unwrap(),
        b"%PDF-merged"
    );

    let bodies = posted_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].matches("name=\"actions\"").count(), 1);
    assert!(bodies[0].contains("merge"));
    assert!(!bodies[0].contains("split"));
    assert!(bodies[0].contains("filename=\"a.pdf\""));
    assert!(bodies[0].contains("filename=\"b.pdf\""));

    assert_eq!(session.state().files().len(), 2);
    assert_eq!(session.state().actions().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_upload_keeps_selections_for_retry() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Encountered an error"))
        .expect(2)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    session.add_files(input_files(&write_inputs(input.path())));
    session.toggle_action("split").unwrap();

    session.submit();
    assert!(session.wait_for_idle(WAIT));
    assert!(matches!(
        session.state().last_result(),
        Some(UploadResult::Failed { .. })
    ));
    assert_eq!(session.state().files().len(), 2);
    assert_eq!(session.state().actions().len(), 1);
    assert!(saved_names(output.path()).is_empty());

    session.submit();
    assert!(session.state().is_in_flight());
    assert!(session.wait_for_idle(WAIT));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_submit_while_in_flight_sends_nothing() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF", "out.pdf").set_delay(Duration::from_millis(400)))
        .expect(1)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    session.add_files(input_files(&write_inputs(input.path())));
    session.toggle_action("merge").unwrap();

    session.submit();
    session.submit();
    assert!(session.wait_for_idle(WAIT));

    assert_eq!(posted_bodies(&server).await.len(), 1);
    assert_eq!(saved_names(output.path()), vec!["out.pdf".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_selection_submits_nothing() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF", "out.pdf"))
        .expect(0)
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    session.toggle_action("merge").unwrap();
    session.submit();
    assert!(!session.state().is_in_flight());

    session.toggle_action("merge").unwrap();
    session.add_files(vec![SelectableFile::from_bytes("a.pdf", b"%PDF".to_vec())]);
    session.submit();
    assert!(!session.state().is_in_flight());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(posted_bodies(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clear_policy_empties_selections_after_delivery() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF", "out.pdf"))
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::ClearSelections);
    assert!(session.open(WAIT));
    session.add_files(vec![SelectableFile::from_bytes("a.pdf", b"%PDF".to_vec())]);
    session.toggle_action("merge").unwrap();
    session.submit();
    assert!(session.wait_for_idle(WAIT));

    assert!(session.state().files().is_empty());
    assert!(session.state().actions().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn catalog_failure_fails_actions_command() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-available-actions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    let mut out = Vec::new();
    let err = commands::list_actions(&mut session, WAIT, &mut out).unwrap_err();

    assert!(err.to_string().contains("http status 503"));
    assert!(session.toggle_action("merge").is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn process_command_prints_saved_path() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF-merged", "out.pdf"))
        .expect(1)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    fs::write(input.path().join("readme.txt"), "not a pdf").unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    let request = ProcessRequest {
        actions: vec!["merge".into()],
        paths: vec![input.path().to_path_buf()],
        recursive: false,
    };
    let mut out = Vec::new();
    commands::process(&mut session, &request, WAIT, &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Added 2 file(s)."));
    assert!(printed.trim_end().ends_with("out.pdf"));

    let bodies = posted_bodies(&server).await;
    assert!(bodies[0].contains("filename=\"a.pdf\""));
    assert!(!bodies[0].contains("readme.txt"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn process_command_rejects_unknown_action_before_upload() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF", "out.pdf"))
        .expect(0)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    let request = ProcessRequest {
        actions: vec!["merge".into(), "rotate".into()],
        paths: write_inputs(input.path()),
        recursive: false,
    };
    let err = commands::process(&mut session, &request, WAIT, &mut Vec::new()).unwrap_err();

    assert!(err.to_string().contains("rotate"));
    assert!(!session.state().is_in_flight());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shell_runs_a_batch() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF-merged", "out.pdf"))
        .expect(1)
        .mount(&server)
        .await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    let script = format!(
        "help\nsubmit\nadd {dir}\nadd {dir}/a.pdf\ntoggle merge\ntoggle rotate\nsubmit\nwait\nstatus\nquit\nsubmit\n",
        dir = input.path().display()
    );
    let mut out = Vec::new();
    run_shell(&mut session, Cursor::new(script), &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Merge PDFs"));
    assert!(printed.contains("Nothing to submit"));
    assert!(printed.contains("Added 2 file(s)."));
    assert!(printed.contains("Skipped duplicates: a.pdf."));
    assert!(printed.contains("unknown action \"rotate\""));
    assert!(printed.contains("Submitted request 1."));
    assert!(printed.contains("Upload saved out.pdf"));
    assert!(printed.contains("Actions: Merge PDFs"));
    assert_eq!(saved_names(output.path()), vec!["out.pdf".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engine_updates_are_redrawn_once() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/process-files"))
        .respond_with(processed(b"%PDF-merged", "out.pdf"))
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let mut session = session_for(&server, output.path(), SelectionPolicy::KeepSelections);
    assert!(session.open(WAIT));
    session.add_files(vec![SelectableFile::from_bytes("a.pdf", b"%PDF".to_vec())]);
    session.toggle_action("merge").unwrap();
    session.submit();
    session.consume_dirty();

    let mut out = Vec::new();
    assert!(!report_changes(&mut session, true, &mut out).unwrap());
    assert!(out.is_empty());

    assert!(session.wait_for_idle(WAIT));
    assert!(report_changes(&mut session, true, &mut out).unwrap());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Upload saved out.pdf"));
    assert!(printed.contains("Files (1):"));

    let mut again = Vec::new();
    assert!(!report_changes(&mut session, true, &mut again).unwrap());
    assert!(again.is_empty());
}
