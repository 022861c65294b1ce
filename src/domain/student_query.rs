//! Search, filter and sort options for the staff student list.

use serde::Deserialize;
use utoipa::IntoParams;

use super::choices::{DegreeLevel, Gender, StudentLevel};
use crate::errors::FieldErrors;

/// Raw query string of the student list and export endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// Case-insensitive match on name, username, email, passport or NIK
    pub q: Option<String>,
    /// `maba`, `regular` or `alumni`
    pub level: Option<String>,
    pub faculty: Option<String>,
    /// `M` or `F`
    pub gender: Option<String>,
    pub region_origin: Option<String>,
    /// `D3`, `S1`, `S2` or `S3`
    pub degree_level: Option<String>,
    pub is_draft: Option<bool>,
    /// Sort key, `-` prefix for descending (default `-created_at`)
    pub sort: Option<String>,
}

/// Columns the list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FullName,
    CreatedAt,
    UpdatedAt,
    SemesterLevel,
    Level,
    Faculty,
    Major,
    DegreeLevel,
}

impl SortField {
    fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "full_name" => SortField::FullName,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            "semester_level" => SortField::SemesterLevel,
            "level" => SortField::Level,
            "faculty" => SortField::Faculty,
            "major" => SortField::Major,
            "degree_level" => SortField::DegreeLevel,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for StudentSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl StudentSort {
    /// Parse `field` / `-field`; unknown keys fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::default();
        };
        let (key, descending) = match raw.strip_prefix('-') {
            Some(key) => (key, true),
            None => (raw, false),
        };
        SortField::parse(key)
            .map(|field| Self { field, descending })
            .unwrap_or_default()
    }
}

/// Parsed list criteria handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub level: Option<StudentLevel>,
    pub faculty: Option<String>,
    pub gender: Option<Gender>,
    pub region_origin: Option<String>,
    pub degree_level: Option<DegreeLevel>,
    pub is_draft: Option<bool>,
    pub sort: StudentSort,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_choice<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let value = non_blank(value)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

impl StudentQuery {
    /// Validate choice filters and normalise free-text ones.
    pub fn into_filter(self) -> Result<StudentFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = StudentFilter {
            search: non_blank(self.q),
            level: parse_choice(&mut errors, "level", self.level),
            faculty: non_blank(self.faculty),
            gender: parse_choice(&mut errors, "gender", self.gender),
            region_origin: non_blank(self.region_origin),
            degree_level: parse_choice(&mut errors, "degree_level", self.degree_level),
            is_draft: self.is_draft,
            sort: StudentSort::parse(self.sort.as_deref()),
        };

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_newest_first() {
        assert_eq!(StudentSort::parse(None), StudentSort::default());
        assert_eq!(StudentSort::parse(Some("password")), StudentSort::default());
        assert!(StudentSort::default().descending);
    }

    #[test]
    fn sort_prefix_selects_direction() {
        let sort = StudentSort::parse(Some("-semester_level"));
        assert_eq!(sort.field, SortField::SemesterLevel);
        assert!(sort.descending);

        let sort = StudentSort::parse(Some("full_name"));
        assert_eq!(sort.field, SortField::FullName);
        assert!(!sort.descending);
    }

    #[test]
    fn filter_parses_choices_and_trims_text() {
        let filter = StudentQuery {
            q: Some("  budi ".into()),
            level: Some("maba".into()),
            faculty: Some(" ".into()),
            degree_level: Some("S2".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.search.as_deref(), Some("budi"));
        assert_eq!(filter.level, Some(StudentLevel::NewStudent));
        assert_eq!(filter.faculty, None);
        assert_eq!(filter.degree_level, Some(DegreeLevel::S2));
    }

    #[test]
    fn unknown_choice_filter_is_a_field_error() {
        let errors = StudentQuery {
            gender: Some("X".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();

        assert!(errors.contains("gender"));
    }
}
