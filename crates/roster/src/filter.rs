use std::borrow::Borrow;

use common::{PlacementStatus, Student};

/// Criteria combine with AND; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<PlacementStatus>,
    pub min_cgpa: Option<f64>,
}

impl StudentFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.department_term().is_none()
            && self.status.is_none()
            && self.min_cgpa.is_none()
    }

    pub fn matches(&self, student: &Student) -> bool {
        if let Some(term) = self.search_term() {
            let hit = [&student.name, &student.roll_number, &student.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(department) = self.department_term()
            && !student.department.trim().eq_ignore_ascii_case(department)
        {
            return false;
        }
        if self.status.is_some_and(|status| status != student.placement_status) {
            return false;
        }
        if self.min_cgpa.is_some_and(|min| student.cgpa < min) {
            return false;
        }
        true
    }

    pub fn apply<'a, S: Borrow<Student>>(&self, students: &'a [S]) -> Vec<&'a Student> {
        students
            .iter()
            .map(Borrow::<Student>::borrow)
            .filter(|student| self.matches(student))
            .collect()
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn department_term(&self) -> Option<&str> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
