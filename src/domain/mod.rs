//! Domain layer - Core business entities and logic
//!
//! Accounts, student records, their fixed choices and the rules for
//! cleaning submitted profile forms. Nothing here touches storage.

pub mod account;
pub mod choices;
pub mod password;
pub mod profile_form;
pub mod student;
pub mod student_query;

pub use account::{
    Account, AccountChanges, AccountResponse, AccountRole, IssuedCredentials, LoginRequest,
    NewAccount, PasswordResetConfirm, PasswordResetRequest, RegisterAccount,
};
pub use choices::{
    DegreeLevel, DiseaseStatus, EducationFunding, Gender, MaritalStatus, StudentLevel,
};
pub use password::Password;
pub use profile_form::{SaveMode, StaffStudentForm, StudentProfileForm};
pub use student::{
    ProfileChanges, Student, StudentProfile, StudentRecord, StudentResponse, StudentStats,
    StudentSummary,
};
pub use student_query::{SortField, StudentFilter, StudentQuery, StudentSort};
