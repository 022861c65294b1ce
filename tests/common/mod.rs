//! In-memory fakes of the persistence and mail seams.
//!
//! `Memory` mirrors the Postgres repositories closely enough to drive the
//! services end to end: student accounts get a provisioned record, deletes
//! take the account with them, and search applies the same filter and sort
//! rules.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use student_records::config::Config;
use student_records::domain::{
    Account, AccountChanges, AccountRole, NewAccount, ProfileChanges, SortField, Student,
    StudentFilter, StudentLevel, StudentRecord, StudentStats,
};
use student_records::errors::{AppError, AppResult};
use student_records::infra::{AccountRepository, StudentRepository, UnitOfWork};
use student_records::jobs::{EmailJob, Mailer};
use student_records::services::{Authenticator, StudentManager};
use student_records::types::PaginationParams;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    students: Vec<Student>,
}

/// Both repositories over one shared set of tables.
#[derive(Default)]
pub struct Memory {
    tables: Mutex<Tables>,
}

impl Memory {
    fn record(&self, student: &Student) -> AppResult<StudentRecord> {
        let tables = self.tables.lock().unwrap();
        Self::join(&tables, student)
    }

    fn join(tables: &Tables, student: &Student) -> AppResult<StudentRecord> {
        let account = tables
            .accounts
            .iter()
            .find(|a| a.id == student.account_id)
            .cloned()
            .ok_or_else(|| AppError::internal("student without account"))?;
        Ok(StudentRecord::new(student.clone(), account))
    }

    pub fn account_count(&self) -> usize {
        self.tables.lock().unwrap().accounts.len()
    }

    pub fn student_count(&self) -> usize {
        self.tables.lock().unwrap().students.len()
    }

    /// Force a record's draft flag, as a staff draft save would.
    pub fn set_draft(&self, student_id: Uuid, is_draft: bool) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(student) = tables.students.iter_mut().find(|s| s.id == student_id) {
            student.is_draft = is_draft;
        }
    }
}

#[async_trait]
impl AccountRepository for Memory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.lock().unwrap();
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> AppResult<bool> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .any(|a| a.email == email && Some(a.id) != except))
    }

    async fn create(&self, account: NewAccount, profile: Option<ProfileChanges>) -> AppResult<Account> {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email.to_lowercase(),
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash: account.password_hash,
            role: account.role,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.lock().unwrap();
        if tables
            .accounts
            .iter()
            .any(|a| a.username == account.username || a.email == account.email)
        {
            return Err(AppError::conflict("Account"));
        }
        if account.role == AccountRole::Student {
            let mut student = Student::provision(account.id);
            if let Some(changes) = profile {
                student.profile = changes.profile;
                student.is_draft = changes.is_draft;
            }
            tables.students.push(student);
        }
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)?;
        account.password_hash = password_hash;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) {
            account.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

fn matches(record: &StudentRecord, filter: &StudentFilter) -> bool {
    let profile = &record.student.profile;

    if let Some(term) = &filter.search {
        let term = term.to_lowercase();
        let haystack = [
            Some(record.account.first_name.as_str()),
            Some(record.account.last_name.as_str()),
            Some(record.account.username.as_str()),
            Some(record.account.email.as_str()),
            profile.passport_number.as_deref(),
            profile.nik.as_deref(),
        ];
        if !haystack
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(&term))
        {
            return false;
        }
    }

    filter.level.map_or(true, |level| profile.level == level)
        && filter.faculty.as_ref().map_or(true, |f| &profile.faculty == f)
        && filter.gender.map_or(true, |gender| profile.gender == gender)
        && filter
            .region_origin
            .as_ref()
            .map_or(true, |r| &profile.region_origin == r)
        && filter
            .degree_level
            .map_or(true, |degree| profile.degree_level == degree)
        && filter
            .is_draft
            .map_or(true, |is_draft| record.student.is_draft == is_draft)
}

fn compare(a: &StudentRecord, b: &StudentRecord, field: SortField) -> Ordering {
    let (pa, pb) = (&a.student.profile, &b.student.profile);
    match field {
        SortField::FullName => (&a.account.first_name, &a.account.last_name, &a.account.username)
            .cmp(&(&b.account.first_name, &b.account.last_name, &b.account.username)),
        SortField::CreatedAt => a.student.created_at.cmp(&b.student.created_at),
        SortField::UpdatedAt => a.student.updated_at.cmp(&b.student.updated_at),
        SortField::SemesterLevel => pa.semester_level.cmp(&pb.semester_level),
        SortField::Level => pa.level.as_str().cmp(pb.level.as_str()),
        SortField::Faculty => pa.faculty.cmp(&pb.faculty),
        SortField::Major => pa.major.cmp(&pb.major),
        SortField::DegreeLevel => pa.degree_level.as_str().cmp(pb.degree_level.as_str()),
    }
}

#[async_trait]
impl StudentRepository for Memory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StudentRecord>> {
        let student = {
            let tables = self.tables.lock().unwrap();
            tables.students.iter().find(|s| s.id == id).cloned()
        };
        student.map(|s| self.record(&s)).transpose()
    }

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<StudentRecord>> {
        let student = {
            let tables = self.tables.lock().unwrap();
            tables
                .students
                .iter()
                .find(|s| s.account_id == account_id)
                .cloned()
        };
        student.map(|s| self.record(&s)).transpose()
    }

    async fn passport_exists(&self, passport: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.students.iter().any(|s| {
            s.profile.passport_number.as_deref() == Some(passport) && Some(s.id) != except
        }))
    }

    async fn nik_exists(&self, nik: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .students
            .iter()
            .any(|s| s.profile.nik.as_deref() == Some(nik) && Some(s.id) != except))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProfileChanges,
        account: AccountChanges,
    ) -> AppResult<StudentRecord> {
        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();

        let student = tables
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        student.profile = changes.profile;
        student.is_draft = changes.is_draft;
        student.updated_at = now;
        let student = student.clone();

        if !account.is_empty() {
            let owner = tables
                .accounts
                .iter_mut()
                .find(|a| a.id == student.account_id)
                .ok_or(AppError::NotFound)?;
            account.apply(owner);
            owner.email = owner.email.to_lowercase();
            owner.updated_at = now;
        }

        Self::join(&tables, &student)
    }

    async fn delete_with_account(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let index = tables
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        let student = tables.students.remove(index);
        tables.accounts.retain(|a| a.id != student.account_id);
        Ok(())
    }

    async fn search(
        &self,
        filter: StudentFilter,
        page: Option<PaginationParams>,
    ) -> AppResult<(Vec<StudentRecord>, u64)> {
        let mut records = {
            let tables = self.tables.lock().unwrap();
            tables
                .students
                .iter()
                .map(|s| Self::join(&tables, s))
                .collect::<AppResult<Vec<_>>>()?
        };
        records.retain(|record| matches(record, &filter));
        records.sort_by(|a, b| {
            let ordering = compare(a, b, filter.sort.field);
            let ordering = if filter.sort.descending {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });

        let total = records.len() as u64;
        let records = match page {
            Some(params) => records
                .into_iter()
                .skip(params.offset() as usize)
                .take(params.limit() as usize)
                .collect(),
            None => records,
        };
        Ok((records, total))
    }

    async fn stats(&self) -> AppResult<StudentStats> {
        let tables = self.tables.lock().unwrap();
        let level = |level: StudentLevel| {
            tables
                .students
                .iter()
                .filter(|s| s.profile.level == level)
                .count() as u64
        };
        Ok(StudentStats {
            total: tables.students.len() as u64,
            drafts: tables.students.iter().filter(|s| s.is_draft).count() as u64,
            new_students: level(StudentLevel::NewStudent),
            regular: level(StudentLevel::Regular),
            alumni: level(StudentLevel::Alumni),
        })
    }
}

/// Unit of work handing out the shared in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    pub memory: Arc<Memory>,
}

impl UnitOfWork for MemoryUnitOfWork {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.memory.clone()
    }

    fn students(&self) -> Arc<dyn StudentRepository> {
        self.memory.clone()
    }
}

/// Mailer that keeps every message.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailJob>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailJob> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<EmailJob> {
        self.sent().into_iter().rev().find(|email| email.to == to)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: EmailJob) -> AppResult<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Services wired over one in-memory store.
pub struct Harness {
    pub uow: MemoryUnitOfWork,
    pub mailer: Arc<RecordingMailer>,
    pub auth: Authenticator<MemoryUnitOfWork>,
    pub students: StudentManager<MemoryUnitOfWork>,
}

impl Harness {
    pub fn new() -> Self {
        let uow = MemoryUnitOfWork::default();
        let mailer = Arc::new(RecordingMailer::default());
        let config = Config::with_secret(TEST_SECRET);
        let shared = Arc::new(uow.clone());

        Self {
            auth: Authenticator::new(shared.clone(), mailer.clone(), config.clone()),
            students: StudentManager::new(shared, mailer.clone(), config),
            uow,
            mailer,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.uow.memory
    }

    /// Insert a staff account directly, as `staff create` would.
    pub async fn staff(&self, username: &str) -> Account {
        let hash = student_records::domain::Password::new("StaffPass123!")
            .unwrap()
            .into_string();
        self.memory()
            .create(
                NewAccount {
                    username: username.to_string(),
                    email: format!("{}@staff.example.com", username),
                    first_name: "Staff".to_string(),
                    last_name: "Member".to_string(),
                    password_hash: hash,
                    role: AccountRole::Staff,
                },
                None,
            )
            .await
            .unwrap()
    }
}

/// Token embedded in a reset link email.
pub fn reset_token(email: &EmailJob) -> String {
    let start = email.body.find("token=").expect("reset link in body") + "token=".len();
    email.body[start..]
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}
