use std::collections::HashSet;

use teller_core::{SelectionSet, StudentRef};

use crate::backend::{BackendError, GroupDirectory};

/// Expands a selection into a concrete, duplicate-free student list.
///
/// Members of every included group are fetched from the directory and
/// unioned with the explicitly included students; exclusion overrides and
/// members of excluded groups are then subtracted. Order is deterministic:
/// group members in group insertion order, then explicit students.
pub async fn resolve_selection(
    selection: &SelectionSet,
    directory: &dyn GroupDirectory,
) -> Result<Vec<StudentRef>, BackendError> {
    let mut resolved: Vec<StudentRef> = Vec::new();
    for group in selection.groups() {
        resolved.extend(directory.fetch_group_members(group.id).await?);
    }
    for student in selection.students(None) {
        resolved.push(student.clone());
    }

    let excluded_group_ids: HashSet<_> = selection
        .excluded_groups()
        .into_iter()
        .map(|group| group.id)
        .collect();
    resolved.retain(|student| {
        !selection.is_excluded(student.id)
            && !student
                .group_id
                .is_some_and(|group_id| excluded_group_ids.contains(&group_id))
    });

    // A student can arrive both explicitly and through a group; keep the
    // first occurrence of each identity.
    let mut seen = HashSet::new();
    resolved.retain(|student| seen.insert(student.id));

    Ok(resolved)
}
