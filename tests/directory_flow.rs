use anyhow::Result;
use entity::EmployeeId;
use platform_api::{EmployeeApi, EmployeeClient};
use products_hr::{
    Action, DeleteOutcome, EmployeesController, HrError, Notice, RecordingNotifier,
    SilentNotifier, Submitted,
};
use server::EmployeeStore;
use suite_tests::{TestBackend, closed_api_url};

#[tokio::test]
async fn add_edit_delete_round_trip() -> Result<()> {
    let backend = TestBackend::start(EmployeeStore::new()).await?;
    let client = EmployeeClient::new(&backend.api_url())?;
    let controller = EmployeesController::new(client, RecordingNotifier::confirming());

    controller.load_all().await?;
    assert!(controller.employees().is_empty());

    controller.set_name("Ada Lovelace");
    controller.set_email("ada@acme.test");
    controller.set_department("Engineering");
    controller.set_salary(Some(8200.0));
    assert_eq!(controller.submit().await?, Submitted::Created);

    let listed = controller.employees();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, EmployeeId(1));
    assert_eq!(listed[0].name, "Ada Lovelace");

    controller.select_for_edit(&listed[0]);
    controller.set_department("Research");
    assert_eq!(
        controller.submit().await?,
        Submitted::Updated(EmployeeId(1))
    );
    assert_eq!(controller.employees()[0].department, "Research");
    assert_eq!(backend.store.get(EmployeeId(1)).unwrap().department, "Research");
    assert!(!controller.is_edit_mode());

    let target = controller.employees()[0].clone();
    assert_eq!(
        controller.confirm_delete(&target).await?,
        DeleteOutcome::Deleted
    );
    assert!(controller.employees().is_empty());
    assert!(backend.store.is_empty());

    assert_eq!(
        controller.notifier().notices(),
        vec![Notice::added(), Notice::updated(), Notice::deleted()]
    );
    backend.shutdown().await
}

#[tokio::test]
async fn declined_delete_leaves_backend_untouched() -> Result<()> {
    let backend = TestBackend::start(EmployeeStore::seeded()).await?;
    let client = EmployeeClient::new(&backend.api_url())?;
    let controller = EmployeesController::new(client, SilentNotifier);

    controller.load_all().await?;
    let before = controller.employees();
    let outcome = controller.confirm_delete(&before[0]).await?;

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(controller.employees(), before);
    assert_eq!(backend.store.len(), before.len());
    backend.shutdown().await
}

#[tokio::test]
async fn server_side_rejection_reports_generic_failure() -> Result<()> {
    let backend = TestBackend::start(EmployeeStore::seeded()).await?;
    let client = EmployeeClient::new(&backend.api_url())?;

    // The form rules would catch this locally, so go through the client to
    // reach the backend's own validation.
    let mut bad = client.get(EmployeeId(1)).await?;
    bad.email = "not-an-email".into();
    let err = client.update(EmployeeId(1), &bad).await.unwrap_err();
    assert_eq!(err.status(), Some(platform_api::StatusCode::BAD_REQUEST));

    let controller = EmployeesController::new(client, RecordingNotifier::confirming());
    let ghost = entity::Employee {
        id: EmployeeId(99),
        ..bad
    };
    controller.select_for_edit(&ghost);
    controller.set_email("ghost@acme.test");
    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, HrError::Api { action: Action::Save, .. }));
    assert_eq!(
        controller.notifier().last().unwrap().message(),
        Some("Update failed, please refresh")
    );
    assert!(controller.is_edit_mode());
    backend.shutdown().await
}

#[tokio::test]
async fn unreachable_backend_is_reported_and_clears_busy() -> Result<()> {
    let client = EmployeeClient::new(&closed_api_url().await?)?;
    let controller = EmployeesController::new(client, RecordingNotifier::confirming());

    let err = controller.load_all().await.unwrap_err();
    assert!(matches!(
        err,
        HrError::Api { action: Action::Load, ref source } if source.is_unavailable()
    ));
    assert_eq!(controller.notifier().last(), Some(Notice::unavailable()));
    assert!(!controller.is_busy());
    Ok(())
}
