use std::{borrow::Borrow, collections::BTreeMap};

use common::{PlacementStatus, Student};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub total: usize,
    pub placed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub opted_out: usize,
    pub blocked: usize,
    /// Percentage of placed students among those who did not opt out.
    pub placement_rate_pct: f64,
    pub average_cgpa: f64,
    pub highest_package_lpa: Option<f64>,
    pub average_package_lpa: Option<f64>,
    pub departments: Vec<DepartmentStats>,
}

pub fn roster_stats<S: Borrow<Student>>(students: &[S]) -> RosterStats {
    let mut placed = 0usize;
    let mut unplaced = 0usize;
    let mut opted_out = 0usize;
    let mut blocked = 0usize;
    let mut cgpa_sum = 0.0f64;
    let mut packages = Vec::new();
    let mut departments: BTreeMap<String, DepartmentStats> = BTreeMap::new();

    for student in students.iter().map(Borrow::<Student>::borrow) {
        cgpa_sum += student.cgpa;
        let department = student.department.trim().to_string();
        let entry = departments
            .entry(department.clone())
            .or_insert_with(|| DepartmentStats {
                department,
                total: 0,
                placed: 0,
            });
        entry.total += 1;

        match student.placement_status {
            PlacementStatus::Placed => {
                placed += 1;
                entry.placed += 1;
                if let Some(pkg) = student.package_lpa {
                    packages.push(pkg);
                }
            }
            PlacementStatus::Unplaced => unplaced += 1,
            PlacementStatus::OptedOut => opted_out += 1,
            PlacementStatus::Blocked => blocked += 1,
        }
    }

    let total = students.len();
    let eligible = total - opted_out;
    RosterStats {
        total,
        placed,
        unplaced,
        opted_out,
        blocked,
        placement_rate_pct: ratio(placed, eligible) * 100.0,
        average_cgpa: if total == 0 {
            0.0
        } else {
            cgpa_sum / total as f64
        },
        highest_package_lpa: packages.iter().copied().reduce(f64::max),
        average_package_lpa: if packages.is_empty() {
            None
        } else {
            Some(packages.iter().sum::<f64>() / packages.len() as f64)
        },
        departments: departments.into_values().collect(),
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
