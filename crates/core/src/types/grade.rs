//! Nutrition grade.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a value is not a nutrition grade letter.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid nutrition grade {0:?}: expected a single letter from A to E")]
pub struct GradeError(pub String);

/// Single-letter nutrition score, `A` (best) to `E` (worst).
///
/// The derived ordering follows the letters, so `A < B < … < E` and a
/// "smaller" grade is a healthier one.
///
/// ```
/// use purbeurre_core::NutritionGrade;
///
/// let c: NutritionGrade = "c".parse().unwrap();
/// assert!(NutritionGrade::A < c);
/// assert!(NutritionGrade::A.is_better_than(c));
/// assert_eq!(c.to_string(), "C");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NutritionGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutritionGrade {
    /// All grades from best to worst.
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Parse a grade letter, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError`] for anything other than `a`-`e` / `A`-`E`.
    pub fn from_char(c: char) -> Result<Self, GradeError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            _ => Err(GradeError(c.to_string())),
        }
    }

    /// The upper-case letter of this grade.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }

    /// The upper-case letter as a string slice (database representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Whether `self` is strictly healthier than `other`.
    #[must_use]
    pub fn is_better_than(self, other: Self) -> bool {
        self < other
    }
}

impl fmt::Display for NutritionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutritionGrade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(GradeError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for NutritionGrade {
    type Error = GradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NutritionGrade> for String {
    fn from(grade: NutritionGrade) -> Self {
        grade.as_str().to_owned()
    }
}

// SQLx support (with postgres feature). Stored as a one-character VARCHAR.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for NutritionGrade {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NutritionGrade {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for NutritionGrade {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
