use crate::{GroupId, GroupRef, StudentId, StudentRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Student(StudentRef),
    Group(GroupRef),
}

/// One membership decision: a subject plus an optional exclusion override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub subject: Subject,
    pub excluded: bool,
}

/// A mixed set of students and groups with per-student exclusion overrides.
///
/// Selecting a group does not materialize its members; an excluded member is
/// tracked as an override entry and only subtracted when the selection is
/// resolved against the group directory. At most one entry exists per
/// (kind, id); iteration order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    entries: Vec<SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes a single student. No-op when the student is already selected,
    /// explicitly or through an included group.
    pub fn push_student(&mut self, student: StudentRef) {
        if self.has_student(&student) {
            return;
        }
        if let Some(index) = self.position_student(student.id) {
            // An exclusion override: clearing it restores group membership.
            self.entries.remove(index);
            if self.group_included(student.group_id) {
                return;
            }
        }
        self.entries.push(SelectionEntry {
            subject: Subject::Student(student),
            excluded: false,
        });
    }

    /// Includes a whole group. Explicit inclusions of its members become
    /// plain group membership, so they are dropped first.
    pub fn push_group(&mut self, group: GroupRef) {
        if self.has_group(&group) {
            return;
        }
        self.entries.retain(|entry| match &entry.subject {
            Subject::Student(student) => entry.excluded || student.group_id != Some(group.id),
            Subject::Group(_) => true,
        });
        self.entries.push(SelectionEntry {
            subject: Subject::Group(group),
            excluded: false,
        });
    }

    /// Deselects a single student.
    ///
    /// A student that is only included through a group gets an exclusion
    /// override instead of being removed; popping an already-overridden
    /// student undoes the override. An explicit inclusion with no included
    /// owning group is deleted outright.
    pub fn pop_student(&mut self, student: &StudentRef) {
        if let Some(index) = self.position_student(student.id) {
            if self.entries[index].excluded {
                self.entries.remove(index);
            } else if self.group_included(student.group_id) {
                self.entries[index].excluded = true;
            } else {
                self.entries.remove(index);
            }
        } else if self.group_included(student.group_id) {
            self.entries.push(SelectionEntry {
                subject: Subject::Student(student.clone()),
                excluded: true,
            });
        }
    }

    /// Deselects a group and drops every exclusion override that referenced
    /// one of its members; overrides are meaningless without the group.
    pub fn pop_group(&mut self, group: &GroupRef) {
        self.entries.retain(|entry| match &entry.subject {
            Subject::Group(candidate) => candidate.id != group.id,
            Subject::Student(student) => !(entry.excluded && student.group_id == Some(group.id)),
        });
    }

    pub fn toggle_student(&mut self, student: &StudentRef) {
        if self.has_student(student) {
            self.pop_student(student);
        } else {
            self.push_student(student.clone());
        }
    }

    pub fn toggle_group(&mut self, group: &GroupRef) {
        if self.has_group(group) {
            self.pop_group(group);
        } else {
            self.push_group(group.clone());
        }
    }

    /// True when the student is selected, explicitly or through an included
    /// group with no exclusion override.
    pub fn has_student(&self, student: &StudentRef) -> bool {
        if self.has_student_explicit(student.id) {
            return true;
        }
        self.group_included(student.group_id) && !self.is_excluded(student.id)
    }

    /// True only for an explicit, non-excluded student entry.
    pub fn has_student_explicit(&self, student_id: StudentId) -> bool {
        self.position_student(student_id)
            .is_some_and(|index| !self.entries[index].excluded)
    }

    pub fn has_group(&self, group: &GroupRef) -> bool {
        self.entries.iter().any(|entry| {
            !entry.excluded && matches!(&entry.subject, Subject::Group(candidate) if candidate.id == group.id)
        })
    }

    pub fn is_excluded(&self, student_id: StudentId) -> bool {
        self.position_student(student_id)
            .is_some_and(|index| self.entries[index].excluded)
    }

    /// Explicitly included, non-excluded students, optionally limited to one
    /// group. Group members are implicit and never listed here.
    pub fn students(&self, group: Option<GroupId>) -> Vec<&StudentRef> {
        self.student_entries(false, group)
    }

    /// Students carrying an exclusion override, optionally limited to one group.
    pub fn excluded_students(&self, group: Option<GroupId>) -> Vec<&StudentRef> {
        self.student_entries(true, group)
    }

    pub fn groups(&self) -> Vec<&GroupRef> {
        self.group_entries(false)
    }

    pub fn excluded_groups(&self) -> Vec<&GroupRef> {
        self.group_entries(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position_student(&self, student_id: StudentId) -> Option<usize> {
        self.entries.iter().position(|entry| {
            matches!(&entry.subject, Subject::Student(candidate) if candidate.id == student_id)
        })
    }

    fn group_included(&self, group_id: Option<GroupId>) -> bool {
        let Some(group_id) = group_id else {
            return false;
        };
        self.entries.iter().any(|entry| {
            !entry.excluded
                && matches!(&entry.subject, Subject::Group(candidate) if candidate.id == group_id)
        })
    }

    fn student_entries(&self, excluded: bool, group: Option<GroupId>) -> Vec<&StudentRef> {
        self.entries
            .iter()
            .filter(|entry| entry.excluded == excluded)
            .filter_map(|entry| match &entry.subject {
                Subject::Student(student) => Some(student),
                Subject::Group(_) => None,
            })
            .filter(|student| group.is_none() || student.group_id == group)
            .collect()
    }

    fn group_entries(&self, excluded: bool) -> Vec<&GroupRef> {
        self.entries
            .iter()
            .filter(|entry| entry.excluded == excluded)
            .filter_map(|entry| match &entry.subject {
                Subject::Group(group) => Some(group),
                Subject::Student(_) => None,
            })
            .collect()
    }
}
