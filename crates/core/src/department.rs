//! Department - the closed set of approving parties
//!
//! Every subject needs sign-off from each of these departments before a
//! clearance certificate is issued. The set is fixed at compile time so that
//! aggregation over it can never miss a member.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Approving department
///
/// # Examples
/// ```
/// use clearance_core::Department;
///
/// let finance = Department::parse("finance").unwrap();
/// assert_eq!(finance, Department::Finance);
/// assert_eq!(Department::AcademicDepartment.to_string(), "department");
/// assert!(Department::parse("cafeteria").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Department {
    /// Bursary / fees office
    Finance,

    /// Library (outstanding loans and fines)
    Library,

    /// The subject's own academic department
    #[strum(serialize = "department")]
    #[serde(rename = "department")]
    AcademicDepartment,

    /// Halls of residence
    Hostel,

    /// Registry / central administration
    Administration,
}

impl Department {
    /// Parse a department name, mapping unknown names to `InvalidDepartment`
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        name.trim()
            .parse()
            .map_err(|_| CoreError::InvalidDepartment(name.to_string()))
    }

    /// All departments in declaration order
    pub fn all() -> impl Iterator<Item = Department> {
        Department::iter()
    }

    /// Number of departments that must approve
    pub fn count() -> usize {
        Department::iter().count()
    }

    /// Canonical name (same as `Display`)
    pub fn name(&self) -> &'static str {
        match self {
            Department::Finance => "finance",
            Department::Library => "library",
            Department::AcademicDepartment => "department",
            Department::Hostel => "hostel",
            Department::Administration => "administration",
        }
    }
}
