use serde::Serialize;

use super::domain::{BloodType, Grade, GradeId, GuardianType, GuardianTypeId};

/// Static reference entry that can be looked up by id.
pub trait DirectoryEntry: Clone {
    type Id: PartialEq;

    fn entry_id(&self) -> &Self::Id;
    fn display_name(&self) -> &str;
}

impl DirectoryEntry for Grade {
    type Id = GradeId;

    fn entry_id(&self) -> &GradeId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DirectoryEntry for GuardianType {
    type Id = GuardianTypeId;

    fn entry_id(&self) -> &GuardianTypeId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Read-only catalog of reference entries.
#[derive(Debug, Clone)]
pub struct Directory<T> {
    entries: Vec<T>,
}

impl<T: DirectoryEntry> Directory<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn list(&self) -> &[T] {
        &self.entries
    }

    pub fn find(&self, id: &T::Id) -> Option<&T> {
        self.entries.iter().find(|entry| entry.entry_id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.find(id).is_some()
    }

    /// Display name for `id`, if it exists.
    pub fn name_of(&self, id: &T::Id) -> Option<&str> {
        self.find(id).map(DirectoryEntry::display_name)
    }
}

/// Blood type option as rendered by forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BloodTypeOption {
    pub value: BloodType,
    pub label: &'static str,
}

/// All reference catalogs consulted during intake and acceptance.
#[derive(Debug, Clone)]
pub struct SchoolDirectories {
    pub grades: Directory<Grade>,
    pub guardian_types: Directory<GuardianType>,
}

impl SchoolDirectories {
    pub fn new(grades: Vec<Grade>, guardian_types: Vec<GuardianType>) -> Self {
        Self {
            grades: Directory::new(grades),
            guardian_types: Directory::new(guardian_types),
        }
    }

    /// Catalog used by the kindergarten out of the box.
    pub fn standard() -> Self {
        let grades = [
            ("grade-pk", "Pre-Kinder"),
            ("grade-kg1", "Kinder 1"),
            ("grade-kg2", "Kinder 2"),
            ("grade-prep", "Preparatoria"),
        ]
        .into_iter()
        .map(|(id, name)| Grade {
            id: GradeId(id.to_string()),
            name: name.to_string(),
        })
        .collect();

        let guardian_types = [("1", "Padre"), ("2", "Madre"), ("3", "Tutor")]
            .into_iter()
            .map(|(id, name)| GuardianType {
                id: GuardianTypeId(id.to_string()),
                name: name.to_string(),
            })
            .collect();

        Self::new(grades, guardian_types)
    }

    pub fn blood_types(&self) -> Vec<BloodTypeOption> {
        BloodType::ALL
            .into_iter()
            .map(|value| BloodTypeOption {
                value,
                label: value.label(),
            })
            .collect()
    }
}

impl Default for SchoolDirectories {
    fn default() -> Self {
        Self::standard()
    }
}
