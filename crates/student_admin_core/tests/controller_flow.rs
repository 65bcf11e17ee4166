//! End-to-end flows of the students controller against an in-memory backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use student_admin_core::controller::Phase;
use student_admin_core::ports::{PortError, PortResult, StudentService};
use student_admin_core::toast::{self, ToastKind};
use student_admin_core::validation::{Field, StudentForm, FUTURE_DATE_OF_BIRTH};
use student_admin_core::{
    DeleteOutcome, RecordId, Student, StudentCreateUpdateRequest, StudentsController, SubmitOutcome,
};

#[derive(Default)]
struct Backend {
    rows: Vec<Value>,
    next_id: i64,
    list_calls: usize,
    mutation_calls: usize,
    fail_list: Option<PortError>,
    fail_mutation: Option<PortError>,
}

#[derive(Default, Clone)]
struct FakeStudents(Arc<Mutex<Backend>>);

impl FakeStudents {
    fn with_students(count: i64) -> Self {
        let fake = Self::default();
        {
            let mut backend = fake.0.lock().unwrap();
            for id in 1..=count {
                backend.rows.push(json!({
                    "id": id,
                    "firstName": format!("First{id}"),
                    "lastName": format!("Last{id}"),
                    "classes": [{"id": 1, "name": "Maths"}]
                }));
            }
            backend.next_id = count + 1;
        }
        fake
    }

    fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.0.lock().unwrap()
    }

    fn row(request: &StudentCreateUpdateRequest, id: i64) -> Value {
        json!({
            "id": id,
            "firstName": request.first_name,
            "lastName": request.last_name,
            "email": request.email,
            "classes": request.class_ids,
        })
    }
}

#[async_trait]
impl StudentService for FakeStudents {
    async fn list_students(&self, page: usize, page_size: usize) -> PortResult<Value> {
        let mut backend = self.backend();
        backend.list_calls += 1;
        assert_eq!((page, page_size), (1, 1000), "the snapshot is always fetched in bulk");
        if let Some(e) = backend.fail_list.take() {
            return Err(e);
        }
        Ok(json!({ "items": backend.rows.clone(), "totalCount": backend.rows.len() }))
    }

    async fn get_student(&self, id: &RecordId) -> PortResult<Student> {
        let backend = self.backend();
        backend
            .rows
            .iter()
            .find(|row| RecordId::Int(row["id"].as_i64().unwrap()) == *id)
            .map(|row| student_admin_core::decode::student(row.clone()).unwrap())
            .ok_or_else(|| PortError::application("Student not found", Some(404), None))
    }

    async fn create_student(&self, request: &StudentCreateUpdateRequest) -> PortResult<Option<Student>> {
        let mut backend = self.backend();
        backend.mutation_calls += 1;
        if let Some(e) = backend.fail_mutation.take() {
            return Err(e);
        }
        let id = backend.next_id;
        backend.next_id += 1;
        backend.rows.push(Self::row(request, id));
        Ok(None)
    }

    async fn update_student(
        &self,
        id: &RecordId,
        request: &StudentCreateUpdateRequest,
    ) -> PortResult<Option<Student>> {
        let mut backend = self.backend();
        backend.mutation_calls += 1;
        if let Some(e) = backend.fail_mutation.take() {
            return Err(e);
        }
        let RecordId::Int(raw) = id else {
            return Err(PortError::application("bad id", Some(400), None));
        };
        let row = Self::row(request, *raw);
        match backend.rows.iter_mut().find(|r| r["id"].as_i64() == Some(*raw)) {
            Some(slot) => *slot = row,
            None => return Err(PortError::application("Student not found", Some(404), None)),
        }
        Ok(None)
    }

    async fn delete_student(&self, id: &RecordId) -> PortResult<()> {
        let mut backend = self.backend();
        backend.mutation_calls += 1;
        if let Some(e) = backend.fail_mutation.take() {
            return Err(e);
        }
        let before = backend.rows.len();
        backend.rows.retain(|r| RecordId::Int(r["id"].as_i64().unwrap_or_default()) != *id);
        if backend.rows.len() == before {
            return Err(PortError::application("Student not found", Some(404), None));
        }
        Ok(())
    }
}

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn controller(fake: &FakeStudents) -> StudentsController {
    StudentsController::new(Arc::new(fake.clone())).with_today(fixed_today)
}

fn new_student_form() -> StudentForm {
    StudentForm {
        first_name: "New".into(),
        last_name: "Student".into(),
        email: "new@example.com".into(),
        date_of_birth: "2010-05-01".into(),
        class_ids: vec![RecordId::Int(1)],
    }
}

#[tokio::test]
async fn mount_loads_the_snapshot_and_slices_the_first_page() {
    let fake = FakeStudents::with_students(12);
    let mut page = controller(&fake);

    page.mount(1).await.unwrap();

    let state = page.state();
    assert_eq!(state.phase, Phase::Loaded);
    assert_eq!(state.page.total_count(), 12);
    assert_eq!(state.page.total_pages(), 3);
    let ids: Vec<String> = state.page.visible().iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn page_changes_are_served_from_the_snapshot() {
    let fake = FakeStudents::with_students(12);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();

    page.change_page(3).await.unwrap();
    page.change_page(2).await.unwrap();

    assert_eq!(fake.backend().list_calls, 1);
    assert_eq!(page.state().page.current_page(), 2);
    assert_eq!(page.state().page.visible()[0].id, RecordId::Int(6));
}

#[tokio::test]
async fn load_failure_then_retry() {
    let fake = FakeStudents::with_students(3);
    fake.backend().fail_list = Some(PortError::transport("Network Error"));
    let mut page = controller(&fake);

    assert!(page.mount(1).await.is_err());
    assert_eq!(page.state().phase, Phase::LoadError("Network Error".into()));
    let toast = page.state().toast.clone().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, toast::LOAD_FAILED);

    page.retry().await.unwrap();
    assert_eq!(page.state().phase, Phase::Loaded);
    assert_eq!(page.state().page.visible().len(), 3);
}

#[tokio::test]
async fn deleting_the_only_row_on_the_last_page_clamps_back() {
    let fake = FakeStudents::with_students(11);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    page.change_page(3).await.unwrap();
    assert_eq!(page.state().page.visible().len(), 1);

    let last = page.state().page.visible()[0].clone();
    page.request_delete(last);
    assert_eq!(page.confirm_delete().await, DeleteOutcome::Deleted);

    let state = page.state();
    assert_eq!(fake.backend().list_calls, 2);
    assert_eq!(state.page.total_pages(), 2);
    assert_eq!(state.page.current_page(), 2);
    assert_eq!(state.page.visible().len(), 5);
    assert!(state.pending_delete.is_none());
    assert!(!state.deleting);
    assert_eq!(state.toast.as_ref().unwrap().message, toast::STUDENT_DELETED);
}

#[tokio::test]
async fn retry_after_a_failed_refetch_still_clamps_the_page() {
    let fake = FakeStudents::with_students(11);
    let mut page = controller(&fake);
    page.mount(3).await.unwrap();

    let last = page.state().page.visible()[0].clone();
    page.request_delete(last);
    fake.backend().fail_list = Some(PortError::transport("Network Error"));
    assert_eq!(page.confirm_delete().await, DeleteOutcome::Deleted);
    assert_eq!(page.state().phase, Phase::LoadError("Network Error".into()));

    page.retry().await.unwrap();

    let state = page.state();
    assert_eq!(state.phase, Phase::Loaded);
    assert_eq!(state.page.total_count(), 10);
    assert_eq!(state.page.total_pages(), 2);
    assert_eq!(state.page.current_page(), 2);
    assert_eq!(state.page.visible().len(), 5);
}

#[tokio::test]
async fn deleting_mid_list_stays_on_the_current_page() {
    let fake = FakeStudents::with_students(12);
    let mut page = controller(&fake);
    page.mount(2).await.unwrap();

    let victim = page.state().page.visible()[0].clone();
    page.request_delete(victim);
    page.confirm_delete().await;

    assert_eq!(page.state().page.current_page(), 2);
    assert_eq!(page.state().page.total_count(), 11);
}

#[tokio::test]
async fn failed_delete_keeps_the_dialog_and_the_snapshot() {
    let fake = FakeStudents::with_students(6);
    fake.backend().fail_mutation = Some(PortError::application("Internal server error", Some(500), None));
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();

    let victim = page.state().page.visible()[0].clone();
    page.request_delete(victim);
    let outcome = page.confirm_delete().await;

    assert_eq!(outcome, DeleteOutcome::Failed("Internal server error".into()));
    assert!(page.state().pending_delete.is_some());
    assert!(!page.state().deleting);
    assert_eq!(fake.backend().list_calls, 1);

    page.cancel_delete();
    assert!(page.state().pending_delete.is_none());
    assert_eq!(page.confirm_delete().await, DeleteOutcome::NothingPending);
}

#[tokio::test]
async fn creating_from_page_two_resets_to_page_one() {
    let fake = FakeStudents::with_students(8);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    page.change_page(2).await.unwrap();

    page.open_create_form();
    assert_eq!(page.submit(&new_student_form()).await, SubmitOutcome::Saved);

    let state = page.state();
    assert_eq!(state.page.current_page(), 1);
    assert_eq!(state.page.total_count(), 9);
    assert!(!state.form.is_open());
    assert!(!state.submitting);
    assert_eq!(state.toast.as_ref().unwrap().message, toast::STUDENT_CREATED);
}

#[tokio::test]
async fn updating_from_page_two_stays_on_page_two() {
    let fake = FakeStudents::with_students(8);
    let mut page = controller(&fake);
    page.mount(2).await.unwrap();

    let target = page.state().page.visible()[1].clone();
    let mut form = StudentForm::from_student(&target);
    form.first_name = "Renamed".into();
    page.open_edit_form(target.clone());
    assert_eq!(page.submit(&form).await, SubmitOutcome::Saved);

    let state = page.state();
    assert_eq!(state.page.current_page(), 2);
    let edited = state.page.find(&target.id).unwrap();
    assert_eq!(edited.first_name, "Renamed");
    assert_eq!(state.page.visible()[1].id, target.id);
    assert_eq!(state.toast.as_ref().unwrap().message, toast::STUDENT_UPDATED);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_server() {
    let fake = FakeStudents::with_students(2);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    page.open_create_form();

    let form = StudentForm { date_of_birth: "2999-01-01".into(), ..new_student_form() };
    let errors = match page.submit(&form).await {
        SubmitOutcome::Invalid(errors) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(Field::DateOfBirth), Some(FUTURE_DATE_OF_BIRTH));
    assert_eq!(page.state().form_errors, errors);
    assert!(page.state().form.is_open());
    assert_eq!(fake.backend().mutation_calls, 0);
}

#[tokio::test]
async fn server_rejection_keeps_the_form_open_for_retry() {
    let fake = FakeStudents::with_students(2);
    fake.backend().fail_mutation = Some(PortError::application("Email already exists", Some(409), None));
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    page.open_create_form();

    let outcome = page.submit(&new_student_form()).await;
    assert_eq!(outcome, SubmitOutcome::Failed("Email already exists".into()));
    assert!(page.state().form.is_open());
    assert_eq!(page.state().toast.as_ref().unwrap().message, "Email already exists");

    assert_eq!(page.submit(&new_student_form()).await, SubmitOutcome::Saved);
    assert_eq!(page.state().page.total_count(), 3);
}

#[tokio::test]
async fn submit_without_an_open_form_is_refused() {
    let fake = FakeStudents::with_students(1);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    assert_eq!(page.submit(&new_student_form()).await, SubmitOutcome::NoForm);
}

#[tokio::test]
async fn failed_refetch_after_a_save_surfaces_a_load_error() {
    let fake = FakeStudents::with_students(2);
    let mut page = controller(&fake);
    page.mount(1).await.unwrap();
    page.open_create_form();
    fake.backend().fail_list = Some(PortError::application("Service temporarily unavailable", Some(503), None));

    assert_eq!(page.submit(&new_student_form()).await, SubmitOutcome::Saved);
    assert_eq!(
        page.state().phase,
        Phase::LoadError("Service temporarily unavailable".into())
    );
    assert_eq!(page.state().toast.as_ref().unwrap().message, toast::LOAD_FAILED);
}
