//! Staff student management against in-memory storage.

mod common;

use common::Harness;
use uuid::Uuid;

use student_records::domain::{
    SaveMode, StaffStudentForm, StudentLevel, StudentProfileForm, StudentQuery,
};
use student_records::errors::AppError;
use student_records::services::{AuthService, CreatedStudent, Portal, StudentService};
use student_records::types::PaginationParams;

fn form(email: &str, first_name: &str, faculty: &str, semester: u8) -> StaffStudentForm {
    StaffStudentForm {
        email: Some(email.into()),
        first_name: Some(first_name.into()),
        last_name: Some("Santoso".into()),
        action: Some(SaveMode::Save),
        profile: StudentProfileForm {
            gender: Some("M".into()),
            marital_status: Some("single".into()),
            degree_level: Some("S1".into()),
            semester_level: Some(semester.to_string()),
            faculty: Some(faculty.into()),
            level: Some("regular".into()),
            ..Default::default()
        },
    }
}

async fn create(harness: &Harness, staff_id: Uuid, form: StaffStudentForm) -> CreatedStudent {
    harness.students.create(staff_id, form).await.unwrap()
}

#[tokio::test]
async fn staff_create_issues_working_credentials() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let created = create(&harness, staff.id, form("budi@example.com", "Budi", "Law", 3)).await;

    assert_eq!(created.credentials.username, "budi");
    assert_eq!(created.record.email(), "budi@example.com");
    assert!(!created.record.student.is_draft);

    let email = harness
        .mailer
        .last_to("budi@example.com")
        .expect("credentials email queued");
    assert!(email.body.contains(&created.credentials.password));

    harness
        .auth
        .login(
            created.credentials.username.clone(),
            created.credentials.password.clone(),
            Portal::Student,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn usernames_get_numeric_suffixes() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let first = create(&harness, staff.id, form("budi@one.example", "Budi", "Law", 1)).await;
    let second = create(&harness, staff.id, form("budi@two.example", "Budi", "Law", 1)).await;
    let third = create(&harness, staff.id, form("Budi@three.example", "Budi", "Law", 1)).await;

    assert_eq!(first.credentials.username, "budi");
    assert_eq!(second.credentials.username, "budi2");
    assert_eq!(third.credentials.username, "budi3");
}

#[tokio::test]
async fn duplicate_identity_fields_are_reported_together() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let mut first = form("budi@example.com", "Budi", "Law", 1);
    first.profile.passport_number = Some("A1234567".into());
    first.profile.nik = Some("3201010101010001".into());
    create(&harness, staff.id, first).await;

    let mut second = form("BUDI@example.com", "Other", "Law", 1);
    second.profile.passport_number = Some("A1234567".into());
    second.profile.nik = Some("3201010101010001".into());

    match harness.students.create(staff.id, second).await {
        Err(AppError::InvalidFields(errors)) => {
            assert!(errors.contains("email"));
            assert!(errors.contains("passport_number"));
            assert!(errors.contains("nik"));
        }
        other => panic!("expected field errors, got {:?}", other),
    }
    assert_eq!(harness.memory().student_count(), 1);
}

#[tokio::test]
async fn save_enforces_required_fields_but_draft_does_not() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let incomplete = StaffStudentForm {
        email: Some("siti@example.com".into()),
        first_name: Some("Siti".into()),
        ..Default::default()
    };

    match harness.students.create(staff.id, incomplete.clone()).await {
        Err(AppError::InvalidFields(errors)) => {
            for field in ["gender", "marital_status", "degree_level", "semester_level"] {
                assert!(errors.contains(field), "{}", field);
            }
        }
        other => panic!("expected field errors, got {:?}", other),
    }

    let draft = StaffStudentForm {
        action: Some(SaveMode::Draft),
        ..incomplete
    };
    let created = create(&harness, staff.id, draft).await;
    assert!(created.record.student.is_draft);
    assert_eq!(created.record.student.profile.semester_level, 1);
}

#[tokio::test]
async fn staff_create_requires_email_and_first_name() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let form = StaffStudentForm {
        action: Some(SaveMode::Draft),
        ..Default::default()
    };
    match harness.students.create(staff.id, form).await {
        Err(AppError::InvalidFields(errors)) => {
            assert!(errors.contains("email"));
            assert!(errors.contains("first_name"));
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}

#[tokio::test]
async fn staff_update_changes_account_and_profile() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let budi = create(&harness, staff.id, form("budi@example.com", "Budi", "Law", 1)).await;
    create(&harness, staff.id, form("siti@example.com", "Siti", "Law", 1)).await;

    let taken = harness
        .students
        .update(staff.id, budi.record.id(), form("Siti@example.com", "Budi", "Law", 1))
        .await;
    assert!(matches!(taken, Err(AppError::InvalidFields(ref e)) if e.contains("email")));

    let updated = harness
        .students
        .update(staff.id, budi.record.id(), form("budi.s@example.com", "Budiman", "Medicine", 7))
        .await
        .unwrap();

    assert_eq!(updated.email(), "budi.s@example.com");
    assert_eq!(updated.account.first_name, "Budiman");
    assert_eq!(updated.student.profile.faculty, "Medicine");
    assert_eq!(updated.student.profile.semester_level, 7);
    // Username is fixed at creation
    assert_eq!(updated.account.username, "budi");
}

#[tokio::test]
async fn update_keeps_own_identity_numbers_but_not_anothers() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let mut budi_form = form("budi@example.com", "Budi", "Law", 1);
    budi_form.profile.passport_number = Some("A1234567".into());
    budi_form.profile.nik = Some("3201010101010001".into());
    let budi = create(&harness, staff.id, budi_form.clone()).await;
    let siti = create(&harness, staff.id, form("siti@example.com", "Siti", "Law", 1)).await;

    // Re-saving the same values does not clash with the record itself.
    budi_form.profile.faculty = Some("Medicine".into());
    let updated = harness
        .students
        .update(staff.id, budi.record.id(), budi_form)
        .await
        .unwrap();
    assert_eq!(updated.student.profile.passport_number.as_deref(), Some("A1234567"));
    assert_eq!(updated.student.profile.nik.as_deref(), Some("3201010101010001"));
    assert_eq!(updated.student.profile.faculty, "Medicine");

    let mut siti_form = form("siti@example.com", "Siti", "Law", 1);
    siti_form.profile.passport_number = Some(" A1234567 ".into());
    siti_form.profile.nik = Some("3201010101010001".into());
    match harness.students.update(staff.id, siti.record.id(), siti_form).await {
        Err(AppError::InvalidFields(errors)) => {
            assert!(errors.contains("passport_number"));
            assert!(errors.contains("nik"));
            assert!(!errors.contains("email"));
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let result = harness
        .students
        .update(staff.id, Uuid::new_v4(), form("x@example.com", "X", "Law", 1))
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn credential_reset_replaces_the_password() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let created = create(&harness, staff.id, form("budi@example.com", "Budi", "Law", 1)).await;

    let fresh = harness
        .students
        .reset_credentials(staff.id, created.record.id())
        .await
        .unwrap();
    assert_eq!(fresh.username, "budi");
    assert_ne!(fresh.password, created.credentials.password);

    let old = harness
        .auth
        .login("budi".into(), created.credentials.password.clone(), Portal::Student)
        .await;
    assert!(matches!(old, Err(AppError::InvalidCredentials)));

    harness
        .auth
        .login("budi".into(), fresh.password.clone(), Portal::Student)
        .await
        .unwrap();
    assert_eq!(harness.mailer.sent().len(), 2);
}

#[tokio::test]
async fn delete_removes_record_and_account() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let created = create(&harness, staff.id, form("budi@example.com", "Budi", "Law", 1)).await;
    assert_eq!(harness.memory().account_count(), 2);

    harness
        .students
        .delete(staff.id, created.record.id())
        .await
        .unwrap();

    assert!(matches!(
        harness.students.get(created.record.id()).await,
        Err(AppError::NotFound)
    ));
    assert_eq!(harness.memory().account_count(), 1);

    let login = harness
        .auth
        .login("budi".into(), created.credentials.password, Portal::Student)
        .await;
    assert!(matches!(login, Err(AppError::InvalidCredentials)));

    let again = harness.students.delete(staff.id, created.record.id()).await;
    assert!(matches!(again, Err(AppError::NotFound)));
}

#[tokio::test]
async fn list_filters_sorts_and_pages() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    create(&harness, staff.id, form("a@example.com", "Ani", "Law", 5)).await;
    create(&harness, staff.id, form("b@example.com", "Bayu", "Law", 2)).await;
    create(&harness, staff.id, form("c@example.com", "Citra", "Law", 8)).await;
    create(&harness, staff.id, form("d@example.com", "Dewi", "Medicine", 1)).await;

    let query = StudentQuery {
        faculty: Some("Law".into()),
        sort: Some("semester_level".into()),
        ..Default::default()
    };
    let page = harness
        .students
        .list(query.clone(), PaginationParams::new(1, 2))
        .await
        .unwrap();

    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    let semesters: Vec<i16> = page.data.iter().map(|s| s.semester_level).collect();
    assert_eq!(semesters, vec![2, 5]);

    let last = harness
        .students
        .list(query, PaginationParams::new(2, 2))
        .await
        .unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.data[0].semester_level, 8);
}

#[tokio::test]
async fn list_searches_names_and_identity_numbers() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let mut with_passport = form("a@example.com", "Ani", "Law", 5);
    with_passport.profile.passport_number = Some("X9876543".into());
    create(&harness, staff.id, with_passport).await;
    create(&harness, staff.id, form("b@example.com", "Bayu", "Law", 2)).await;

    let by_name = harness
        .students
        .list(
            StudentQuery {
                q: Some("bAy".into()),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_name.meta.total, 1);
    assert_eq!(by_name.data[0].username, "b");

    let by_passport = harness
        .students
        .list(
            StudentQuery {
                q: Some("x9876".into()),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_passport.meta.total, 1);
    assert_eq!(by_passport.data[0].full_name, "Ani Santoso");
}

#[tokio::test]
async fn list_filters_drafts_and_levels() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    create(&harness, staff.id, form("a@example.com", "Ani", "Law", 5)).await;
    let mut new_student = form("b@example.com", "Bayu", "Law", 1);
    new_student.profile.level = Some("maba".into());
    new_student.action = Some(SaveMode::Draft);
    create(&harness, staff.id, new_student).await;

    let drafts = harness
        .students
        .list(
            StudentQuery {
                is_draft: Some(true),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(drafts.meta.total, 1);
    assert_eq!(drafts.data[0].level, StudentLevel::NewStudent);

    let invalid = harness
        .students
        .list(
            StudentQuery {
                level: Some("postdoc".into()),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await;
    assert!(matches!(invalid, Err(AppError::InvalidFields(ref e)) if e.contains("level")));
}

#[tokio::test]
async fn export_writes_header_and_matching_rows() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let mut quoted = form("a@example.com", "Ani", "Law, Politics", 5);
    quoted.profile.region_origin = Some("Aceh".into());
    create(&harness, staff.id, quoted).await;
    create(&harness, staff.id, form("b@example.com", "Bayu", "Medicine", 2)).await;

    let csv = harness
        .students
        .export_csv(
            staff.id,
            StudentQuery {
                region_origin: Some("Aceh".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,username,full_name,email"));
    assert!(lines[1].contains("\"Law, Politics\""));
    assert!(!csv.contains("Bayu"));
}

#[tokio::test]
async fn dashboard_depends_on_role() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;
    let created = create(&harness, staff.id, form("a@example.com", "Ani", "Law", 5)).await;
    let mut draft = form("b@example.com", "Bayu", "Law", 1);
    draft.action = Some(SaveMode::Draft);
    create(&harness, staff.id, draft).await;

    let staff_view = harness.students.dashboard(staff.id).await.unwrap();
    let stats = staff_view.stats.expect("staff stats");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.drafts, 1);
    assert_eq!(stats.regular, 2);
    assert!(staff_view.profile.is_none());

    let student_view = harness
        .students
        .dashboard(created.record.account.id)
        .await
        .unwrap();
    assert!(student_view.stats.is_none());
    assert_eq!(
        student_view.profile.map(|p| p.id),
        Some(created.record.id())
    );
}
