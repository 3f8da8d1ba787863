//! Installation steps driven through a recording runner

mod helpers;

use canvas_installer::core::{InstallConfig, Step, StepContext, StepResult};
use canvas_installer::steps::{
    CanvasUserStep, ConfigureCanvasStep, PostgresStep, RichContentEditorStep, SslStep,
    ToolchainStep, VirtualHostsStep,
};
use canvas_installer::{canvas_pipeline, InMemoryStateStore, Orchestrator, RunOutcome};
use helpers::*;
use std::sync::Arc;

async fn execute(
    step: &dyn Step,
    config: &InstallConfig,
    runner: &RecordingRunner,
    reporter: &RecordingReporter,
) -> StepResult {
    let ctx = StepContext::new(config, runner, reporter, step.name());
    step.execute(&ctx).await
}

fn with_ssl_and_rce() -> InstallConfig {
    InstallConfig {
        skip_ssl: false,
        skip_rce: false,
        ..example_config()
    }
}

#[tokio::test]
async fn test_ssl_skipped_touches_nothing() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let result = execute(&SslStep, &example_config(), &runner, &reporter).await;

    assert!(result.is_success());
    assert_eq!(runner.total_calls(), 0);
    assert_eq!(reporter.skipped(), vec!["Setup SSL Certificate"]);
}

#[tokio::test]
async fn test_ssl_requests_certificate_for_domain() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let result = execute(&SslStep, &with_ssl_and_rce(), &runner, &reporter).await;

    assert!(result.is_success());
    assert!(runner
        .commands()
        .contains(&"certbot --apache -d 'canvas.example.com'".to_string()));
    assert!(reporter.skipped().is_empty());
}

#[tokio::test]
async fn test_failed_command_becomes_step_failure() {
    let runner = RecordingRunner::failing_on("certbot --apache");
    let reporter = RecordingReporter::new();

    let result = execute(&SslStep, &with_ssl_and_rce(), &runner, &reporter).await;

    let reason = result.reason().expect("step should fail").to_string();
    assert!(reason.contains("Getting SSL certificate"), "{}", reason);
    assert!(reason.contains("code 1"), "{}", reason);
    // Nothing after the failing command ran
    assert!(!runner.commands().iter().any(|c| c.contains("crontab")));
}

#[tokio::test]
async fn test_rce_skipped_touches_nothing() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let result = execute(&RichContentEditorStep, &example_config(), &runner, &reporter).await;

    assert!(result.is_success());
    assert_eq!(runner.total_calls(), 0);
    assert_eq!(reporter.skipped(), vec!["Enable Rich Content Editor"]);
}

#[tokio::test]
async fn test_rce_writes_env_and_vault_without_recloning() {
    let runner = RecordingRunner::new().with_probes_succeeding();
    let reporter = RecordingReporter::new();

    let result = execute(&RichContentEditorStep, &with_ssl_and_rce(), &runner, &reporter).await;

    assert!(result.is_success());
    assert!(!runner.commands().iter().any(|c| c.starts_with("git clone")));

    let env = runner.written("/var/canvas-rce-api/.env").expect(".env written");
    assert!(env.contains("PORT=3001"));
    assert!(env.contains("ECOSYSTEM_SECRET="));
    assert!(runner
        .written("/var/canvas/config/vault_contents.yml")
        .is_some());
}

#[tokio::test]
async fn test_existing_canvas_user_is_left_alone() {
    let runner = RecordingRunner::new().with_probes_succeeding();
    let reporter = RecordingReporter::new();

    let result = execute(&CanvasUserStep, &example_config(), &runner, &reporter).await;

    assert!(result.is_success());
    assert!(runner.commands().is_empty());
    assert_eq!(runner.probes(), vec!["id canvas"]);
}

#[tokio::test]
async fn test_missing_canvas_user_is_created() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let result = execute(&CanvasUserStep, &example_config(), &runner, &reporter).await;

    assert!(result.is_success());
    let commands = runner.commands();
    assert!(commands[0].starts_with("adduser"));
    assert!(commands[1].starts_with("usermod -aG sudo"));
}

#[tokio::test]
async fn test_http_only_virtual_host_when_ssl_skipped() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let result = execute(&VirtualHostsStep, &example_config(), &runner, &reporter).await;

    assert!(result.is_success());
    let conf = runner
        .written("/etc/apache2/sites-available/canvas.conf")
        .expect("http vhost written");
    assert!(conf.contains("canvas.example.com"));
    assert!(runner
        .written("/etc/apache2/sites-available/canvas-ssl.conf")
        .is_none());
    assert!(!runner.commands().iter().any(|c| c.contains("canvas-ssl")));
}

#[tokio::test]
async fn test_outgoing_mail_only_with_smtp_server() {
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();
    execute(&ConfigureCanvasStep, &example_config(), &runner, &reporter).await;
    assert!(runner
        .written("/var/canvas/config/outgoing_mail.yml")
        .is_none());
    assert!(runner.written("/var/canvas/config/database.yml").is_some());
    assert!(runner.written("/var/canvas/config/security.yml").is_some());

    let mut config = example_config();
    config.smtp_server = "smtp.gmail.com".to_string();
    config.smtp_from_email = "lms@example.com".to_string();
    let runner = RecordingRunner::new();
    execute(&ConfigureCanvasStep, &config, &runner, &reporter).await;
    let mail = runner
        .written("/var/canvas/config/outgoing_mail.yml")
        .expect("mail config written");
    assert!(mail.contains("smtp.gmail.com"));
}

#[tokio::test]
async fn test_downloads_piped_into_other_commands_use_pipefail() {
    let steps: [&dyn Step; 2] = [&PostgresStep, &ToolchainStep];
    for step in steps {
        let runner = RecordingRunner::new();
        let reporter = RecordingReporter::new();

        let result = execute(step, &example_config(), &runner, &reporter).await;
        assert!(result.is_success(), "{}", step.name());

        let downloads: Vec<String> = runner
            .commands()
            .into_iter()
            .filter(|c| (c.contains("wget") || c.contains("curl")) && c.contains(" | "))
            .collect();
        assert!(!downloads.is_empty(), "{}", step.name());
        for command in downloads {
            assert!(command.starts_with("set -o pipefail;"), "{}", command);
        }
    }
}

#[tokio::test]
async fn test_full_pipeline_stops_at_prerequisites_on_bare_host() {
    // The recording runner returns empty output, so no OS or memory check can pass
    let orchestrator = Orchestrator::new(
        canvas_pipeline().unwrap(),
        InMemoryStateStore::new(),
        Arc::new(RecordingRunner::new()),
    );
    let reporter = RecordingReporter::new();

    let outcome = orchestrator
        .run_pipeline(&ScriptedCollector::new(example_config()), &reporter)
        .await
        .unwrap();

    match outcome {
        RunOutcome::Failed {
            step_index,
            step_name,
            ..
        } => {
            assert_eq!(step_index, 0);
            assert_eq!(step_name, "System Prerequisites Check");
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(reporter.started(), vec!["System Prerequisites Check"]);
}
