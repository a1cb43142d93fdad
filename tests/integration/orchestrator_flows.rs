//! Integration tests for orchestrated commands against a fake sdfcli

use sdfkit::command::CommandKind;
use sdfkit::error::SdfError;
use sdfkit::interaction::PRODUCTION_DEPLOY_PROMPT;
use sdfkit::orchestrator::{CommandFlags, CommandRequest, Phase, DEPLOY_SCRATCH_DIR};
use sdfkit::ui::NoticeLevel;
use std::fs;
use std::path::Path;

use crate::integration::test_utils::{
    fake_cli_lock, orchestrator, project_dir, write_file, FakeCli, RecordingUi,
};

#[tokio::test]
async fn test_single_environment_is_selected_without_prompting() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let env = orchestrator.select_environment().await.unwrap();

    assert_eq!(env.authid, "sandbox1");
    assert_eq!(ui.choose_count(), 0);
    assert_eq!(ui.last_status().as_deref(), Some("SDF: sandbox1"));
    assert_eq!(cli.calls_for("manageauth"), vec!["manageauth -list"]);
}

#[tokio::test]
async fn test_command_arguments_for_chosen_environment() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["prod", "sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    ui.answer_choice("sandbox1");
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator
        .execute(CommandRequest::new(CommandKind::Validate))
        .await
        .unwrap();

    let expected = format!("validate -authid sandbox1 -p {} -server", project.path().display());
    assert_eq!(cli.calls_for("validate"), vec![expected]);
    assert_eq!(ui.choose_count(), 1);

    // The selection and registry are cached for the next command.
    orchestrator
        .execute(CommandRequest::new(CommandKind::ListBundles))
        .await
        .unwrap();
    assert_eq!(cli.calls_for("listbundles"), vec!["listbundles -authid sandbox1"]);
    assert_eq!(cli.calls_for("manageauth").len(), 1);
    assert_eq!(ui.choose_count(), 1);
    assert_eq!(ui.last_status().as_deref(), Some("SDF: sandbox1"));
}

#[tokio::test]
async fn test_commands_without_default_parameters() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator
        .execute(CommandRequest::new(CommandKind::AddDependencies))
        .await
        .unwrap();

    let expected = format!("adddependencies -p {} -all", project.path().display());
    assert_eq!(cli.calls_for("adddependencies"), vec![expected]);
    // No environment was needed, so the registry was never loaded.
    assert!(cli.calls_for("manageauth").is_empty());
}

#[tokio::test]
async fn test_output_filtering_and_list_objects_transform() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
listfiles)
echo "[INFO] starting"
echo "Done."
echo "result-a"
echo "result-b"
;;
listobjects)
echo "Using user credentials."
echo "customrecord_type:Some Label"
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});
    let collect = CommandFlags {
        collect_data: true,
        ..CommandFlags::default()
    };

    let files = orchestrator
        .run_simple(CommandKind::ListFiles, collect)
        .await
        .unwrap();
    assert_eq!(files, vec!["result-a", "result-b"]);
    // Raw output is still shown, boilerplate included.
    assert!(ui.output.lock().unwrap().contains(&"[INFO] starting".to_string()));

    let objects = orchestrator.list_objects(None, collect).await.unwrap();
    assert_eq!(objects, vec!["Some Label"]);

    // Without data-return mode the result is not handed back.
    let quiet = orchestrator
        .run_simple(CommandKind::ListFiles, CommandFlags::default())
        .await
        .unwrap();
    assert!(quiet.is_empty());
}

#[tokio::test]
async fn test_production_deploy_confirmation() {
    let _guard = fake_cli_lock();
    let body = format!(
        r#"
case "$1" in
deploy)
echo "{prompt}"
read answer
echo "answer $answer" >> "$LOG"
echo "Installation COMPLETE"
;;
esac
"#,
        prompt = PRODUCTION_DEPLOY_PROMPT
    );
    let cli = FakeCli::new(&["prod"], &body);
    let project = project_dir();

    let ui = RecordingUi::new();
    ui.answer_input("Deploy");
    let confirmed = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});
    confirmed.deploy(CommandFlags::default()).await.unwrap();
    assert!(cli.calls().contains(&"answer YES".to_string()));
    assert_eq!(
        ui.notices_at(NoticeLevel::Info),
        vec!["Installation of deployment was completed."]
    );

    let ui = RecordingUi::new();
    ui.answer_input("deploy");
    let rejected = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});
    rejected.deploy(CommandFlags::default()).await.unwrap();
    assert!(cli.calls().contains(&"answer NO".to_string()));
}

#[tokio::test]
async fn test_failed_quick_deploy_still_cleans_up() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
deploy)
pwd >> "$LOG"
mkdir -p "$PROJECT_SCRATCH"
echo "An error occurred during deployment"
exit 3
;;
esac
"#;
    let project = project_dir();
    let scratch = project.path().join(DEPLOY_SCRATCH_DIR);
    let body = body.replace("$PROJECT_SCRATCH", &scratch.display().to_string());
    let cli = FakeCli::new(&["sandbox1"], &body);
    write_file(project.path(), "FileCabinet/SuiteScripts/a.js", "// a");
    write_file(
        project.path(),
        "deploy.xml",
        "<deploy><files><path>~/FileCabinet/SuiteScripts/*</path></files></deploy>",
    );
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |config| {
        config.deploy.use_quick_deploy = true;
    });

    let err = orchestrator
        .deploy(CommandFlags {
            add_project_parameter: true,
            show_output: false,
            ..CommandFlags::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SdfError::Session(_)), "unexpected error: {}", err);

    let calls = cli.calls();
    let deploy_index = calls
        .iter()
        .position(|line| line.starts_with("deploy "))
        .expect("deploy was invoked");
    let staging = Path::new(&calls[deploy_index + 1]);
    assert!(calls[deploy_index].contains("sdfkit-deploy-"));
    assert!(staging.display().to_string().contains("sdfkit-deploy-"));
    assert!(!staging.exists(), "staging directory should be removed");
    assert!(!scratch.exists(), "scratch directory should be removed");

    let state = orchestrator.state();
    assert_eq!(state.flags, CommandFlags::default());
    assert_eq!(state.phase, Phase::Idle);
    assert_eq!(state.status, "SDF: sandbox1");
}

#[tokio::test]
async fn test_quick_deploy_stages_only_manifest_files() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
deploy)
find . -type f | sort >> "$LOG"
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    write_file(project.path(), "FileCabinet/SuiteScripts/lib/a.js", "// a");
    write_file(project.path(), "FileCabinet/SuiteScripts/b.js", "// b");
    write_file(project.path(), "Objects/customscript_a.xml", "<x/>");
    write_file(project.path(), "notes/readme.txt", "skip");
    write_file(project.path(), "manifest.xml", "<manifest/>");
    write_file(
        project.path(),
        "deploy.xml",
        "<deploy><files><path>~/FileCabinet/SuiteScripts/*</path></files></deploy>",
    );
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |config| {
        config.deploy.use_quick_deploy = true;
    });

    orchestrator.deploy(CommandFlags::default()).await.unwrap();

    let calls = cli.calls();
    assert!(calls.contains(&"./FileCabinet/SuiteScripts/lib/a.js".to_string()));
    assert!(calls.contains(&"./FileCabinet/SuiteScripts/b.js".to_string()));
    assert!(calls.contains(&"./deploy.xml".to_string()));
    assert!(calls.contains(&"./manifest.xml".to_string()));
    assert!(!calls.iter().any(|line| line.contains("readme.txt")));
    assert!(!calls.iter().any(|line| line.contains("customscript_a.xml")));
}

#[tokio::test]
async fn test_import_files_uses_listing() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
listfiles)
echo "/SuiteScripts/a.js"
echo "/SuiteScripts/lib/b.js"
echo "/Templates/c.html"
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    let ui = RecordingUi::new();
    ui.answer_many(&["/SuiteScripts/a.js", "/SuiteScripts/lib/b.js"]);
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator.import_files().await.unwrap();

    let (_, offered) = ui.choose_calls.lock().unwrap()[0].clone();
    assert_eq!(offered, vec!["/SuiteScripts/a.js", "/SuiteScripts/lib/b.js"]);
    let expected = format!(
        "importfiles -authid sandbox1 -p {} -paths /SuiteScripts/a.js /SuiteScripts/lib/b.js",
        project.path().display()
    );
    assert_eq!(cli.calls_for("importfiles"), vec![expected]);
    assert_eq!(orchestrator.state().flags, CommandFlags::default());
}

#[tokio::test]
async fn test_cancelled_selection_does_not_run_the_tool() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let err = orchestrator
        .import_objects(Some("customrecordtype"))
        .await
        .unwrap_err();
    // Listing succeeded but returned nothing to pick from.
    assert!(matches!(err, SdfError::Validation(_)));

    let err = orchestrator.import_bundle().await.unwrap_err();
    assert!(matches!(err, SdfError::Cancelled));
    assert!(cli.calls_for("importbundle").is_empty());
    assert!(cli.calls_for("importobjects").is_empty());
}

#[tokio::test]
async fn test_import_objects_creates_destination() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
listobjects)
echo "customrecordtype:customrecord_a"
echo "customrecordtype:customrecord_b"
echo "customrecordtype:internal_only"
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    let ui = RecordingUi::new();
    ui.answer_many(&["customrecord_a", "customrecord_b"]);
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator
        .import_objects(Some("customrecordtype"))
        .await
        .unwrap();

    assert!(project.path().join("Objects/Records").is_dir());
    let (_, offered) = ui.choose_calls.lock().unwrap()[0].clone();
    assert_eq!(offered, vec!["customrecord_a", "customrecord_b"]);
    let expected = format!(
        "importobjects -authid sandbox1 -p {} -scriptid customrecord_a customrecord_b -type customrecordtype -destinationfolder /Objects/Records",
        project.path().display()
    );
    assert_eq!(cli.calls_for("importobjects"), vec![expected]);

    let err = orchestrator.import_objects(Some("savedsearch")).await.unwrap_err();
    assert!(matches!(err, SdfError::Validation(_)));
}

#[tokio::test]
async fn test_import_bundle_requires_numeric_id() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    ui.answer_input("abc");
    ui.answer_input(" 12345 ");
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let err = orchestrator.import_bundle().await.unwrap_err();
    assert!(matches!(err, SdfError::Validation(_)));
    assert!(cli.calls_for("importbundle").is_empty());

    orchestrator.import_bundle().await.unwrap();
    let expected = format!(
        "importbundle -authid sandbox1 -p {} -bundleid 12345",
        project.path().display()
    );
    assert_eq!(cli.calls_for("importbundle"), vec![expected]);
}

#[tokio::test]
async fn test_update_uses_local_definitions() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    write_file(project.path(), "Objects/Scripts/customscript_a.xml", "<x/>");
    write_file(project.path(), "Objects/customlist_b.xml", "<x/>");
    let ui = RecordingUi::new();
    ui.answer_many(&["customlist_b.xml", "customscript_a.xml"]);
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator.update().await.unwrap();

    let expected = format!(
        "update -authid sandbox1 -p {} -scriptid customlist_b customscript_a",
        project.path().display()
    );
    assert_eq!(cli.calls_for("update"), vec![expected]);
}

#[tokio::test]
async fn test_update_custom_record_requires_records_folder() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
updatecustomrecordwithinstances)
echo "The custom record does not exist."
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let err = orchestrator.update_custom_record().await.unwrap_err();
    assert!(matches!(err, SdfError::Validation(_)));
    assert!(cli.calls_for("updatecustomrecordwithinstances").is_empty());

    write_file(project.path(), "Objects/Records/customrecord_a.xml", "<x/>");
    ui.answer_choice("customrecord_a.xml");
    orchestrator.update_custom_record().await.unwrap();
    assert_eq!(cli.calls_for("updatecustomrecordwithinstances").len(), 1);
    assert!(cli.calls_for("updatecustomrecordwithinstances")[0].ends_with("-scriptid customrecord_a"));
    assert_eq!(
        ui.notices_at(NoticeLevel::Error),
        vec!["Custom record does not exist for updating. Please Import Object first."]
    );
}

#[tokio::test]
async fn test_create_project_skips_default_parameters() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    ui.answer_input("newproject");
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator.create_project().await.unwrap();

    let parent = project.path().parent().unwrap();
    let expected = format!(
        "createproject -type ACCOUNTCUSTOMIZATION -parentdirectory {} -projectname newproject",
        parent.display()
    );
    assert_eq!(cli.calls_for("createproject"), vec![expected]);
    assert!(cli.calls_for("manageauth").is_empty());
}

#[tokio::test]
async fn test_sync_replaces_folders_and_ignores_failures() {
    let _guard = fake_cli_lock();
    let body = r#"
case "$1" in
listfiles)
echo "/SuiteScripts/a.js"
;;
listobjects)
case "$*" in
*customrecordtype*) echo "customrecordtype:customrecord_a" ;;
*customlist*) exit 2 ;;
esac
;;
esac
"#;
    let cli = FakeCli::new(&["sandbox1"], body);
    let project = project_dir();
    write_file(project.path(), "Objects/stale.xml", "<x/>");
    write_file(project.path(), "FileCabinet/SuiteScripts/stale.js", "// stale");
    let ui = RecordingUi::new();
    ui.answer_input("OK");
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    orchestrator.sync().await.unwrap();

    assert!(!project.path().join("Objects/stale.xml").exists());
    assert!(!project.path().join("FileCabinet/SuiteScripts/stale.js").exists());
    assert!(project.path().join("Objects/Records").is_dir());
    assert_eq!(cli.calls_for("importfiles").len(), 1);
    let imports = cli.calls_for("importobjects");
    assert_eq!(imports.len(), 1);
    assert!(imports[0].contains("-type customrecordtype"));
    // One sub-flow failed, so no success notice.
    assert!(!ui
        .notices_at(NoticeLevel::Info)
        .contains(&"Sync completed".to_string()));
    assert_eq!(orchestrator.state().phase, Phase::Idle);
    assert_eq!(orchestrator.state().status, "SDF: sandbox1");
}

#[tokio::test]
async fn test_sync_requires_ok() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["sandbox1"], "");
    let project = project_dir();
    write_file(project.path(), "Objects/keep.xml", "<x/>");
    let ui = RecordingUi::new();
    ui.answer_input("ok");
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let err = orchestrator.sync().await.unwrap_err();
    assert!(matches!(err, SdfError::Cancelled));
    assert!(project.path().join("Objects/keep.xml").exists());
    assert!(cli.calls().is_empty());
}

#[tokio::test]
async fn test_missing_tool_short_circuits_every_command() {
    let project = project_dir();
    let missing = project.path().join("no-such-sdfcli");
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(
        project.path(),
        &missing.display().to_string(),
        ui.clone(),
        |_| {},
    );

    let err = orchestrator.select_environment().await.unwrap_err();
    assert!(matches!(err, SdfError::ToolUnavailable));
    assert!(orchestrator.state().tool_unavailable);

    let err = orchestrator
        .execute(CommandRequest::new(CommandKind::AddDependencies))
        .await
        .unwrap_err();
    assert!(matches!(err, SdfError::ToolUnavailable));
    assert!(matches!(
        orchestrator.authenticate().await,
        Err(SdfError::ToolUnavailable)
    ));
    assert!(ui.terminals.lock().unwrap().is_empty());

    // One persistent notice, however many commands were refused.
    let errors = ui.notices_at(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("could not be found"));
    assert_eq!(ui.last_status().as_deref(), Some("SDF: CLI not found"));
}

#[tokio::test]
async fn test_no_environments_directs_to_authenticate() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&[], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});

    let err = orchestrator
        .execute(CommandRequest::new(CommandKind::Validate))
        .await
        .unwrap_err();
    assert!(matches!(err, SdfError::NoEnvironments));
    assert!(err.to_string().contains("authenticate"));
    assert!(cli.calls_for("validate").is_empty());

    orchestrator.authenticate().await.unwrap();
    let terminals = ui.terminals.lock().unwrap().clone();
    assert_eq!(terminals, vec![(cli.program(), vec!["authenticate".to_string()])]);
}

#[tokio::test]
async fn test_refresh_config_drops_stale_selection() {
    let _guard = fake_cli_lock();
    let cli = FakeCli::new(&["prod", "sandbox2"], "");
    let project = project_dir();
    let ui = RecordingUi::new();
    let orchestrator = orchestrator(project.path(), &cli.program(), ui.clone(), |_| {});
    orchestrator.preselect("sandbox1");

    let count = orchestrator.refresh_config().await.unwrap();

    assert_eq!(count, 2);
    assert!(orchestrator.active_environment().is_none());
    let warnings = ui.notices_at(NoticeLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("sandbox1"));
    assert_eq!(ui.last_status().as_deref(), Some("SDF: no environment"));

    // A forced refresh always asks the CLI again.
    orchestrator.refresh_config().await.unwrap();
    assert_eq!(cli.calls_for("manageauth").len(), 2);
}

#[tokio::test]
async fn test_remove_folders_recreates_empty_directories() {
    let project = project_dir();
    write_file(project.path(), "Objects/a.xml", "<x/>");
    write_file(project.path(), "FileCabinet/SuiteScripts/a.js", "// a");
    write_file(project.path(), "FileCabinet/Templates/t.html", "<p/>");
    let ui = RecordingUi::new();
    ui.answer_input("OK");
    let orchestrator = orchestrator(project.path(), "sdfcli", ui.clone(), |_| {});

    orchestrator.remove_folders().await.unwrap();

    let objects = project.path().join("Objects");
    assert!(objects.is_dir());
    assert_eq!(fs::read_dir(&objects).unwrap().count(), 0);
    let scripts = project.path().join("FileCabinet/SuiteScripts");
    assert_eq!(fs::read_dir(&scripts).unwrap().count(), 0);
    assert!(project.path().join("FileCabinet/Templates/t.html").exists());
}
