//! Registration, sign-in and password reset against in-memory storage.

mod common;

use common::{reset_token, Harness};
use student_records::domain::{
    PasswordResetConfirm, RegisterAccount, StaffStudentForm, StudentLevel, StudentProfileForm,
};
use student_records::errors::AppError;
use student_records::services::{AuthService, Portal, StudentService};

fn registration(username: &str, email: &str) -> RegisterAccount {
    RegisterAccount {
        username: username.to_string(),
        email: email.to_string(),
        first_name: "Budi".to_string(),
        last_name: "Santoso".to_string(),
        password1: "SecurePass123!".to_string(),
        password2: "SecurePass123!".to_string(),
    }
}

fn complete_profile() -> StudentProfileForm {
    StudentProfileForm {
        gender: Some("M".into()),
        marital_status: Some("single".into()),
        degree_level: Some("S1".into()),
        semester_level: Some("5".into()),
        faculty: Some("Engineering".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn registration_provisions_a_default_profile() {
    let harness = Harness::new();

    let account = harness
        .auth
        .register(registration("budi", "Budi@Example.com"))
        .await
        .unwrap();

    assert_eq!(account.email, "budi@example.com");
    assert!(!account.is_staff());

    let record = harness
        .students
        .my_profile(account.id)
        .await
        .unwrap()
        .expect("provisioned record");
    assert!(!record.student.is_draft);
    assert_eq!(record.student.profile.level, StudentLevel::Regular);
    assert_eq!(record.student.profile.semester_level, 1);
}

#[tokio::test]
async fn registration_rejects_taken_username_and_email() {
    let harness = Harness::new();
    harness
        .auth
        .register(registration("budi", "budi@example.com"))
        .await
        .unwrap();

    let same_username = harness
        .auth
        .register(registration("budi", "other@example.com"))
        .await;
    assert!(matches!(same_username, Err(AppError::Conflict(_))));

    let same_email = harness
        .auth
        .register(registration("budi2", "BUDI@example.com"))
        .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));

    assert_eq!(harness.memory().account_count(), 1);
    assert_eq!(harness.memory().student_count(), 1);
}

#[tokio::test]
async fn registration_reports_password_mismatch_by_field() {
    let harness = Harness::new();
    let mut input = registration("budi", "budi@example.com");
    input.password2 = "SomethingElse1!".to_string();

    match harness.auth.register(input).await {
        Err(AppError::InvalidFields(errors)) => assert!(errors.contains("password2")),
        other => panic!("expected field errors, got {:?}", other),
    }
    assert_eq!(harness.memory().account_count(), 0);
}

#[tokio::test]
async fn portals_admit_only_their_roles() {
    let harness = Harness::new();
    harness
        .auth
        .register(registration("budi", "budi@example.com"))
        .await
        .unwrap();
    harness.staff("registrar").await;

    let token = harness
        .auth
        .login("budi".into(), "SecurePass123!".into(), Portal::Student)
        .await
        .unwrap();
    let claims = harness.auth.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.username, "budi");
    assert!(!claims.is_staff());

    let student_on_staff_portal = harness
        .auth
        .login("budi".into(), "SecurePass123!".into(), Portal::Staff)
        .await;
    assert!(matches!(
        student_on_staff_portal,
        Err(AppError::InvalidCredentials)
    ));

    let staff = harness
        .auth
        .login("registrar".into(), "StaffPass123!".into(), Portal::Staff)
        .await
        .unwrap();
    assert_eq!(staff.role, "staff");

    let wrong_password = harness
        .auth
        .login("budi".into(), "nope-nope".into(), Portal::Student)
        .await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn password_reset_link_works_once() {
    let harness = Harness::new();
    harness
        .auth
        .register(registration("budi", "budi@example.com"))
        .await
        .unwrap();

    harness
        .auth
        .request_password_reset("budi@example.com".into())
        .await
        .unwrap();
    let email = harness
        .mailer
        .last_to("budi@example.com")
        .expect("reset email queued");
    assert_eq!(email.subject, "Reset your password");
    let token = reset_token(&email);

    let confirm = PasswordResetConfirm {
        token,
        new_password1: "BrandNewPass1!".into(),
        new_password2: "BrandNewPass1!".into(),
    };
    harness
        .auth
        .confirm_password_reset(confirm.clone())
        .await
        .unwrap();

    harness
        .auth
        .login("budi".into(), "BrandNewPass1!".into(), Portal::Student)
        .await
        .unwrap();
    let old_password = harness
        .auth
        .login("budi".into(), "SecurePass123!".into(), Portal::Student)
        .await;
    assert!(matches!(old_password, Err(AppError::InvalidCredentials)));

    let reused = harness.auth.confirm_password_reset(confirm).await;
    assert!(matches!(reused, Err(AppError::InvalidResetToken)));
}

#[tokio::test]
async fn password_reset_for_unknown_address_is_silent() {
    let harness = Harness::new();

    harness
        .auth
        .request_password_reset("ghost@example.com".into())
        .await
        .unwrap();

    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn self_save_completes_a_draft() {
    let harness = Harness::new();
    let staff = harness.staff("registrar").await;

    let created = harness
        .students
        .create(
            staff.id,
            StaffStudentForm {
                email: Some("siti@example.com".into()),
                first_name: Some("Siti".into()),
                action: Some(student_records::domain::SaveMode::Draft),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(created.record.student.is_draft);

    let saved = harness
        .students
        .update_my_profile(created.record.account.id, complete_profile())
        .await
        .unwrap();

    assert!(!saved.student.is_draft);
    assert_eq!(saved.student.profile.semester_level, 5);
    assert_eq!(saved.student.profile.faculty, "Engineering");
}

#[tokio::test]
async fn self_save_requires_core_fields() {
    let harness = Harness::new();
    let account = harness
        .auth
        .register(registration("budi", "budi@example.com"))
        .await
        .unwrap();

    match harness
        .students
        .update_my_profile(account.id, StudentProfileForm::default())
        .await
    {
        Err(AppError::InvalidFields(errors)) => {
            assert!(errors.contains("gender"));
            assert!(errors.contains("semester_level"));
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}
