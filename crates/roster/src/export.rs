use std::{borrow::Borrow, fmt::Write as _, str::FromStr};

use common::Student;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("select at least one column to export")]
    NoColumns,
    #[error("unknown export column: {0}")]
    UnknownColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportColumn {
    Name,
    RollNumber,
    Email,
    Phone,
    Department,
    Cgpa,
    BatchYear,
    PlacementStatus,
    CompanyName,
    PackageLpa,
}

impl ExportColumn {
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::RollNumber,
        Self::Email,
        Self::Phone,
        Self::Department,
        Self::Cgpa,
        Self::BatchYear,
        Self::PlacementStatus,
        Self::CompanyName,
        Self::PackageLpa,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNumber => "roll_number",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Department => "department",
            Self::Cgpa => "cgpa",
            Self::BatchYear => "batch_year",
            Self::PlacementStatus => "placement_status",
            Self::CompanyName => "company_name",
            Self::PackageLpa => "package_lpa",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::RollNumber => "Roll Number",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Department => "Department",
            Self::Cgpa => "CGPA",
            Self::BatchYear => "Batch Year",
            Self::PlacementStatus => "Placement Status",
            Self::CompanyName => "Company",
            Self::PackageLpa => "Package (LPA)",
        }
    }

    fn value(self, student: &Student) -> String {
        match self {
            Self::Name => student.name.clone(),
            Self::RollNumber => student.roll_number.clone(),
            Self::Email => student.email.clone(),
            Self::Phone => student.phone.clone().unwrap_or_default(),
            Self::Department => student.department.clone(),
            Self::Cgpa => format!("{:.2}", student.cgpa),
            Self::BatchYear => student.batch_year.to_string(),
            Self::PlacementStatus => student.placement_status.label().to_string(),
            Self::CompanyName => student.company_name.clone().unwrap_or_default(),
            Self::PackageLpa => student
                .package_lpa
                .map(|pkg| format!("{pkg:.2}"))
                .unwrap_or_default(),
        }
    }
}

impl FromStr for ExportColumn {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "roll" => return Ok(Self::RollNumber),
            "status" => return Ok(Self::PlacementStatus),
            "company" => return Ok(Self::CompanyName),
            "package" => return Ok(Self::PackageLpa),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|column| column.key() == normalized)
            .ok_or_else(|| ExportError::UnknownColumn(s.trim().to_string()))
    }
}

/// Parses a comma-separated column list, keeping first occurrences only.
pub fn parse_columns(raw: &str) -> Result<Vec<ExportColumn>, ExportError> {
    let mut columns = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let column = part.parse::<ExportColumn>()?;
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    Ok(columns)
}

pub fn export_csv<S: Borrow<Student>>(
    students: &[S],
    columns: &[ExportColumn],
) -> Result<String, ExportError> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let mut seen = Vec::with_capacity(columns.len());
    for column in columns {
        if !seen.contains(column) {
            seen.push(*column);
        }
    }

    let mut out = String::new();
    let header = seen
        .iter()
        .map(|column| csv_quote(column.label()))
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "{header}");
    for student in students.iter().map(Borrow::<Student>::borrow) {
        let row = seen
            .iter()
            .map(|column| csv_quote(&column.value(student)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{row}");
    }
    Ok(out)
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
