//! Fixed-choice fields of the student record.
//!
//! Each choice is stored as its short code (`"M"`, `"S1"`, `"maba"`, ...) and
//! carries the human label shown in exports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored code.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// Display label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($code => Ok($name::$variant),)+
                    other => Err(AppError::validation(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    Gender {
        Male => ("M", "Male"),
        Female => ("F", "Female"),
    }
}

choice_enum! {
    MaritalStatus {
        Single => ("single", "Single"),
        Married => ("married", "Married"),
    }
}

choice_enum! {
    DegreeLevel {
        D3 => ("D3", "D3"),
        S1 => ("S1", "S1"),
        S2 => ("S2", "S2"),
        S3 => ("S3", "S3"),
    }
}

choice_enum! {
    EducationFunding {
        Scholarship => ("beasiswa", "Beasiswa"),
        SelfFunded => ("non-beasiswa", "Non-Beasiswa"),
    }
}

choice_enum! {
    /// Enrollment stage of the student.
    StudentLevel {
        NewStudent => ("maba", "Mahasiswa Baru"),
        Regular => ("regular", "Reguler"),
        Alumni => ("alumni", "Alumni"),
    }
}

choice_enum! {
    DiseaseStatus {
        Recovered => ("sembuh", "Sembuh"),
        Ongoing => ("belum", "Belum Sembuh"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back() {
        for level in StudentLevel::ALL {
            assert_eq!(level.as_str().parse::<StudentLevel>().unwrap(), *level);
        }
        assert_eq!("non-beasiswa".parse::<EducationFunding>().unwrap(), EducationFunding::SelfFunded);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!("X".parse::<Gender>().is_err());
        assert!("s1".parse::<DegreeLevel>().is_err());
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&StudentLevel::NewStudent).unwrap();
        assert_eq!(json, "\"maba\"");
        let parsed: Gender = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(StudentLevel::NewStudent.label(), "Mahasiswa Baru");
        assert_eq!(DiseaseStatus::Ongoing.label(), "Belum Sembuh");
    }
}
