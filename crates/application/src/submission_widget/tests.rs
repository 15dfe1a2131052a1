use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde_json::json;
use vatdr_domain::{PageLoadEvent, PipelineStage, SubmissionOutcome};

use crate::file_stager::StagingOutcome;
use crate::settings::WidgetSettings;
use crate::test_support::{
    FakeCrmGateway, FakeFileReader, FakeSurface, HostOperation, Journal, selection, test_settings,
};
use crate::widget_ports::SelectedFileContent;

use super::{InFlightGuard, SubmissionWidget, SubmitAttempt};

struct Harness {
    widget: Arc<SubmissionWidget>,
    gateway: Arc<FakeCrmGateway>,
    surface: Arc<FakeSurface>,
    reader: Arc<FakeFileReader>,
    journal: Journal,
    settings: WidgetSettings,
}

fn harness() -> Harness {
    harness_with(test_settings())
}

fn harness_with(settings: WidgetSettings) -> Harness {
    let journal = Journal::default();
    let gateway = Arc::new(FakeCrmGateway::new(journal.clone()));
    let surface = Arc::new(FakeSurface::new(journal.clone()));
    let reader = Arc::new(FakeFileReader::default());
    let widget = SubmissionWidget::new(
        gateway.clone(),
        surface.clone(),
        reader.clone(),
        settings.clone(),
    )
    .unwrap_or_else(|_| unreachable!());

    Harness {
        widget: Arc::new(widget),
        gateway,
        surface,
        reader,
        journal,
        settings,
    }
}

fn page_load() -> PageLoadEvent {
    PageLoadEvent {
        entity_id: "5000001".to_owned(),
    }
}

async fn fill_form(harness: &Harness, date: &str, reason: &str) {
    let layout = &harness.settings.layout;
    harness.surface.set_field(&layout.date_field, date).await;
    harness.surface.set_field(&layout.reason_field, reason).await;
}

async fn stage_five_megabytes(harness: &Harness) {
    let size = 5 * 1024 * 1024;
    let selected = selection("vat-deregistration.pdf", size);
    harness
        .reader
        .insert(
            &selected,
            SelectedFileContent::Bytes(vec![0x42; usize::try_from(size).unwrap_or_default()]),
        )
        .await;

    let outcome = harness.widget.on_file_selected(Some(&selected)).await;
    assert!(matches!(outcome, StagingOutcome::Staged { .. }));
}

#[tokio::test]
async fn complete_submission_closes_the_widget() {
    let harness = harness();
    assert!(harness.widget.on_page_load(&page_load()).await);
    stage_five_megabytes(&harness).await;
    fill_form(&harness, "2024-06-01", "Voluntary").await;

    let attempt = harness.widget.on_submit().await;

    assert_eq!(attempt, SubmitAttempt::Completed(SubmissionOutcome::Success));
    assert_eq!(
        harness.journal.entries().await,
        vec![
            HostOperation::FetchRecord,
            HostOperation::UpdateRecord,
            HostOperation::InvokeProcedure,
            HostOperation::AttachFile,
            HostOperation::AdvanceWorkflow,
            HostOperation::ClosePopup,
        ]
    );
    assert!(harness.surface.closed().await);
}

#[tokio::test]
async fn missing_account_blocks_submission_with_action_error() {
    let harness = harness();
    harness
        .gateway
        .set_record(json!({"id": "5000001", "Account_Name": null}))
        .await;
    assert!(harness.widget.on_page_load(&page_load()).await);
    stage_five_megabytes(&harness).await;
    fill_form(&harness, "2024-06-01", "Voluntary").await;

    let attempt = harness.widget.on_submit().await;

    let SubmitAttempt::Rejected(report) = attempt else {
        unreachable!()
    };
    assert_eq!(report.len(), 1);
    let submit = &harness.settings.layout.submit_control;
    assert_eq!(
        harness.surface.error(submit).await.as_deref(),
        Some("Error: Associated Account ID is missing. Cannot proceed.")
    );
    assert_eq!(harness.surface.control_enabled(submit).await, Some(true));
    assert_eq!(
        harness.surface.control_label(submit).await.as_deref(),
        Some("Submit")
    );
    assert_eq!(
        harness.journal.entries().await,
        vec![HostOperation::FetchRecord]
    );
}

#[tokio::test]
async fn empty_form_reports_every_problem_at_once() {
    let harness = harness();
    harness.gateway.fail_on(HostOperation::FetchRecord).await;
    assert!(!harness.widget.on_page_load(&page_load()).await);

    let attempt = harness.widget.on_submit().await;

    let SubmitAttempt::Rejected(report) = attempt else {
        unreachable!()
    };
    assert_eq!(report.len(), 4);
    let errors = harness.surface.errors().await;
    assert_eq!(
        errors.keys().cloned().collect::<Vec<_>>(),
        vec![
            "error-cert-vat-de-registration".to_owned(),
            "error-effective-de-registration-date".to_owned(),
            "error-reason-de-registration".to_owned(),
            "error-submit_button_id".to_owned(),
        ]
    );
}

#[tokio::test]
async fn rejected_record_update_rearms_submit_for_retry() {
    let harness = harness();
    assert!(harness.widget.on_page_load(&page_load()).await);
    stage_five_megabytes(&harness).await;
    fill_form(&harness, "2024-06-01", "Voluntary").await;
    harness.gateway.fail_on(HostOperation::UpdateRecord).await;

    let attempt = harness.widget.on_submit().await;

    let SubmitAttempt::Completed(outcome) = attempt else {
        unreachable!()
    };
    assert_eq!(outcome.final_stage(), PipelineStage::Failed);
    assert!(harness.gateway.procedure_calls.lock().await.is_empty());
    let submit = &harness.settings.layout.submit_control;
    assert_eq!(harness.surface.control_enabled(submit).await, Some(true));
    assert!(!harness.surface.closed().await);
}

#[tokio::test]
async fn resubmission_after_failure_runs_the_pipeline_from_the_top() {
    let harness = harness();
    assert!(harness.widget.on_page_load(&page_load()).await);
    stage_five_megabytes(&harness).await;
    fill_form(&harness, "2024-06-01", "Voluntary").await;
    harness.gateway.fail_on(HostOperation::AdvanceWorkflow).await;

    let first = harness.widget.on_submit().await;
    assert!(matches!(first, SubmitAttempt::Completed(SubmissionOutcome::Failure { .. })));

    harness.gateway.clear_failure().await;
    let second = harness.widget.on_submit().await;

    assert_eq!(second, SubmitAttempt::Completed(SubmissionOutcome::Success));
    assert_eq!(harness.gateway.updates.lock().await.len(), 2);
    assert!(harness.surface.errors().await.is_empty());
}

#[tokio::test]
async fn oversized_selection_leaves_session_without_file() {
    let harness = harness();
    let selected = selection("huge.pdf", harness.settings.max_upload_bytes + 1);

    let outcome = harness.widget.on_file_selected(Some(&selected)).await;

    assert!(matches!(outcome, StagingOutcome::Rejected { .. }));
    assert!(harness.widget.session_snapshot().await.staged_file().is_none());
}

#[tokio::test]
async fn overlapping_submit_is_ignored_while_pipeline_runs() {
    let harness = harness();
    assert!(harness.widget.on_page_load(&page_load()).await);
    stage_five_megabytes(&harness).await;
    fill_form(&harness, "2024-06-01", "Voluntary").await;
    let release = harness.gateway.hold_updates().await;

    let widget = harness.widget.clone();
    let first = tokio::spawn(async move { widget.on_submit().await });
    harness.gateway.update_entered.notified().await;

    let second = harness.widget.on_submit().await;
    release.notify_one();
    let first = first.await.unwrap_or_else(|_| unreachable!());

    assert_eq!(second, SubmitAttempt::Ignored);
    assert_eq!(first, SubmitAttempt::Completed(SubmissionOutcome::Success));
    let updates = harness
        .journal
        .entries()
        .await
        .into_iter()
        .filter(|operation| *operation == HostOperation::UpdateRecord)
        .count();
    assert_eq!(updates, 1);
}

#[tokio::test(start_paused = true)]
async fn submit_during_staging_delay_does_not_wait_for_it() {
    let mut settings = test_settings();
    settings.staging_delay_ms = 3000;
    let harness = harness_with(settings);
    assert!(harness.widget.on_page_load(&page_load()).await);
    fill_form(&harness, "2024-06-01", "Voluntary").await;
    let selected = selection("certificate.pdf", 3);
    harness
        .reader
        .insert(&selected, SelectedFileContent::Bytes(vec![1, 2, 3]))
        .await;

    let widget = harness.widget.clone();
    let staging = tokio::spawn(async move { widget.on_file_selected(Some(&selected)).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(harness.surface.busy_visible().await);
    assert!(harness.widget.session.try_read().is_ok());

    let started = tokio::time::Instant::now();
    let attempt = harness.widget.on_submit().await;

    assert!(started.elapsed() < Duration::from_millis(3000));
    assert_eq!(attempt, SubmitAttempt::Completed(SubmissionOutcome::Success));
    let staged = staging.await.unwrap_or_else(|_| unreachable!());
    assert!(matches!(staged, StagingOutcome::Staged { .. }));
}

#[test]
fn in_flight_guard_admits_one_holder_at_a_time() {
    let flag = AtomicBool::new(false);

    let first = InFlightGuard::acquire(&flag);
    assert!(first.is_some());
    assert!(InFlightGuard::acquire(&flag).is_none());

    drop(first);
    assert!(InFlightGuard::acquire(&flag).is_some());
}

#[test]
fn invalid_settings_are_rejected_at_construction() {
    let journal = Journal::default();
    let mut settings = test_settings();
    settings.max_upload_bytes = 0;

    let widget = SubmissionWidget::new(
        Arc::new(FakeCrmGateway::new(journal.clone())),
        Arc::new(FakeSurface::new(journal)),
        Arc::new(FakeFileReader::default()),
        settings,
    );

    assert!(widget.is_err());
}
