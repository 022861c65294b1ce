//! Migration: Create students table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts_table::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Non-null text column with an empty default.
fn text(column: Students, len: u32) -> ColumnDef {
    ColumnDef::new(column)
        .string_len(len)
        .not_null()
        .default("")
        .to_owned()
}

/// Unbounded non-null text column with an empty default.
fn long_text(column: Students) -> ColumnDef {
    ColumnDef::new(column).text().not_null().default("").to_owned()
}

fn money(column: Students) -> ColumnDef {
    ColumnDef::new(column).decimal_len(10, 2).null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Students::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Students::AccountId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    // Personal
                    .col(text(Students::WhatsappNumber, 20))
                    .col(text(Students::BirthPlace, 100))
                    .col(ColumnDef::new(Students::BirthDate).date().null())
                    .col(
                        ColumnDef::new(Students::Gender)
                            .string_len(1)
                            .not_null()
                            .default("M"),
                    )
                    .col(
                        ColumnDef::new(Students::MaritalStatus)
                            .string_len(10)
                            .not_null()
                            .default("single"),
                    )
                    .col(text(Students::CitizenshipStatus, 50))
                    .col(text(Students::RegionOrigin, 80))
                    // Family
                    .col(text(Students::ParentsName, 150))
                    .col(text(Students::ParentsPhone, 20))
                    .col(text(Students::GuardianName, 150))
                    .col(text(Students::GuardianPhone, 20))
                    .col(ColumnDef::new(Students::PhotoUrl).string_len(200).null())
                    // Academic
                    .col(
                        ColumnDef::new(Students::Level)
                            .string_len(10)
                            .not_null()
                            .default("regular"),
                    )
                    .col(text(Students::Institution, 120))
                    .col(text(Students::Faculty, 120))
                    .col(text(Students::Major, 120))
                    .col(
                        ColumnDef::new(Students::DegreeLevel)
                            .string_len(2)
                            .not_null()
                            .default("S1"),
                    )
                    .col(
                        ColumnDef::new(Students::SemesterLevel)
                            .small_integer()
                            .not_null()
                            .default(1)
                            .check(
                                Expr::col(Students::SemesterLevel)
                                    .between(1, 14),
                            ),
                    )
                    .col(ColumnDef::new(Students::LatestGrade).decimal_len(4, 2).null())
                    .col(text(Students::SchoolOrigin, 120))
                    // Identity documents
                    .col(
                        ColumnDef::new(Students::PassportNumber)
                            .string_len(20)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Students::Nik)
                            .string_len(16)
                            .null()
                            .unique_key(),
                    )
                    .col(text(Students::LapdikNumber, 30))
                    .col(ColumnDef::new(Students::ArrivalDate).date().null())
                    // Residence
                    .col(text(Students::HomeName, 80))
                    .col(text(Students::HomeLocation, 150))
                    // Health
                    .col(text(Students::DiseaseHistory, 255))
                    .col(ColumnDef::new(Students::DiseaseStatus).string_len(10).null())
                    // Interests and achievements
                    .col(text(Students::SportInterest, 120))
                    .col(long_text(Students::SportAchievement))
                    .col(text(Students::ArtInterest, 120))
                    .col(long_text(Students::ArtAchievement))
                    .col(text(Students::LiteracyInterest, 120))
                    .col(long_text(Students::LiteracyAchievement))
                    .col(text(Students::ScienceInterest, 120))
                    .col(long_text(Students::ScienceAchievement))
                    .col(text(Students::MtqInterest, 120))
                    .col(long_text(Students::MtqAchievement))
                    .col(text(Students::MediaInterest, 120))
                    .col(long_text(Students::MediaAchievement))
                    .col(long_text(Students::OrganizationHistory))
                    // Financial
                    .col(
                        ColumnDef::new(Students::EducationFunding)
                            .string_len(20)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Students::ScholarshipSource)
                            .string_len(150)
                            .null(),
                    )
                    .col(money(Students::LivingCost))
                    .col(money(Students::MonthlyIncome))
                    // State
                    .col(
                        ColumnDef::new(Students::IsDraft)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_account_id")
                            .from(Students::Table, Students::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum Students {
    Table,
    Id,
    AccountId,
    WhatsappNumber,
    BirthPlace,
    BirthDate,
    Gender,
    MaritalStatus,
    CitizenshipStatus,
    RegionOrigin,
    ParentsName,
    ParentsPhone,
    GuardianName,
    GuardianPhone,
    PhotoUrl,
    Level,
    Institution,
    Faculty,
    Major,
    DegreeLevel,
    SemesterLevel,
    LatestGrade,
    SchoolOrigin,
    PassportNumber,
    Nik,
    LapdikNumber,
    ArrivalDate,
    HomeName,
    HomeLocation,
    DiseaseHistory,
    DiseaseStatus,
    SportInterest,
    SportAchievement,
    ArtInterest,
    ArtAchievement,
    LiteracyInterest,
    LiteracyAchievement,
    ScienceInterest,
    ScienceAchievement,
    MtqInterest,
    MtqAchievement,
    MediaInterest,
    MediaAchievement,
    OrganizationHistory,
    EducationFunding,
    ScholarshipSource,
    LivingCost,
    MonthlyIncome,
    IsDraft,
    CreatedAt,
    UpdatedAt,
}
