use std::{borrow::Borrow, cmp::Ordering, str::FromStr};

use common::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    RollNumber,
    Cgpa,
    Department,
    Package,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => Ok(Self::Name),
            "roll" | "roll_number" => Ok(Self::RollNumber),
            "cgpa" => Ok(Self::Cgpa),
            "department" | "dept" => Ok(Self::Department),
            "package" | "package_lpa" => Ok(Self::Package),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Stable sort. Students without a package sort last in either direction.
pub fn sort_students<S: Borrow<Student>>(students: &mut [S], key: SortKey, direction: SortDirection) {
    students.sort_by(|a, b| {
        compare(
            Borrow::<Student>::borrow(a),
            Borrow::<Student>::borrow(b),
            key,
            direction,
        )
    });
}

fn compare(a: &Student, b: &Student, key: SortKey, direction: SortDirection) -> Ordering {
    match key {
        SortKey::Name => direction.apply(a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::RollNumber => direction.apply(a.roll_number.cmp(&b.roll_number)),
        SortKey::Cgpa => direction.apply(a.cgpa.total_cmp(&b.cgpa)),
        SortKey::Department => direction.apply(
            a.department
                .to_lowercase()
                .cmp(&b.department.to_lowercase()),
        ),
        SortKey::Package => match (a.package_lpa, b.package_lpa) {
            (Some(x), Some(y)) => direction.apply(x.total_cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
