use std::collections::HashMap;

use uuid::Uuid;

use crate::models::Subject;

/// Id/name lookup built once per view.
///
/// Duplicate display names resolve to the first subject seen with that name,
/// so the name lookup is deterministic for a given row order. A repeated id
/// keeps its first position but takes the name from its last row.
#[derive(Debug, Clone, Default)]
pub struct SubjectDirectory {
    ordered: Vec<Subject>,
    by_id: HashMap<Uuid, usize>,
    by_name: HashMap<String, Uuid>,
}

impl SubjectDirectory {
    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        let mut directory = SubjectDirectory::default();

        for subject in subjects {
            match directory.by_id.get(&subject.id) {
                Some(index) => directory.ordered[*index].name = subject.name,
                None => {
                    directory.by_id.insert(subject.id, directory.ordered.len());
                    directory.ordered.push(subject);
                }
            }
        }

        for subject in &directory.ordered {
            directory
                .by_name
                .entry(subject.name.clone())
                .or_insert(subject.id);
        }

        directory
    }

    pub fn name(&self, id: &Uuid) -> Option<&str> {
        self.by_id
            .get(id)
            .map(|index| self.ordered[*index].name.as_str())
    }

    pub fn id_for(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(name).copied()
    }

    /// Display names in row order, duplicates included.
    pub fn names(&self) -> Vec<String> {
        self.ordered.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
