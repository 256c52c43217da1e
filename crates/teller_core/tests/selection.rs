use std::sync::Once;

use teller_core::{GroupRef, SelectionSet, StudentRef};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn group(id: u64, name: &str) -> GroupRef {
    GroupRef {
        id,
        name: name.to_string(),
    }
}

fn student(id: u64, group_id: Option<u64>) -> StudentRef {
    StudentRef {
        id,
        account_number: format!("{id:0>10}"),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        group_id,
        shares: Vec::new(),
    }
}

#[test]
fn explicit_inclusion_is_selected() {
    init_logging();
    let mut selection = SelectionSet::new();
    let alice = student(1, None);

    selection.push_student(alice.clone());

    assert!(selection.has_student(&alice));
    assert!(selection.has_student_explicit(alice.id));
    assert_eq!(selection.students(None), vec![&alice]);
}

#[test]
fn push_is_idempotent() {
    init_logging();
    let mut selection = SelectionSet::new();
    let alice = student(1, None);

    selection.push_student(alice.clone());
    selection.push_student(alice.clone());

    assert_eq!(selection.len(), 1);
}

#[test]
fn group_membership_is_implicit_not_materialized() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let alice = student(1, Some(10));

    selection.push_group(homeroom.clone());

    assert!(selection.has_group(&homeroom));
    // Members are selected but never listed until resolution.
    assert!(selection.has_student(&alice));
    assert!(selection.students(Some(10)).is_empty());
}

#[test]
fn push_group_absorbs_prior_explicit_members() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let alice = student(1, Some(10));
    let outsider = student(2, None);

    selection.push_student(alice.clone());
    selection.push_student(outsider.clone());
    selection.push_group(homeroom.clone());

    // Alice is still selected, but only through the group now.
    assert!(selection.has_student(&alice));
    assert!(!selection.has_student_explicit(alice.id));
    assert_eq!(selection.students(None), vec![&outsider]);
}

#[test]
fn pop_of_group_member_becomes_override() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let alice = student(1, Some(10));

    selection.push_group(homeroom.clone());
    selection.pop_student(&alice);

    assert!(!selection.has_student(&alice));
    assert!(selection.is_excluded(alice.id));
    assert_eq!(selection.excluded_students(Some(10)), vec![&alice]);

    // Popping again undoes the override.
    selection.pop_student(&alice);
    assert!(selection.has_student(&alice));
    assert!(!selection.is_excluded(alice.id));
}

#[test]
fn pop_of_ungrouped_explicit_student_deletes_entry() {
    init_logging();
    let mut selection = SelectionSet::new();
    let alice = student(1, None);

    selection.push_student(alice.clone());
    selection.pop_student(&alice);

    assert!(!selection.has_student(&alice));
    assert!(selection.is_empty());
}

#[test]
fn pop_group_removes_member_overrides() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let other = group(11, "Other");
    let alice = student(1, Some(10));
    let bob = student(2, Some(11));

    selection.push_group(homeroom.clone());
    selection.push_group(other.clone());
    selection.pop_student(&alice);
    selection.pop_student(&bob);
    assert!(selection.is_excluded(alice.id));

    selection.pop_group(&homeroom);

    // No zombie override for a student whose group is gone.
    assert!(!selection.is_excluded(alice.id));
    assert!(selection.excluded_students(None).contains(&&bob));
    assert!(!selection.has_group(&homeroom));
    assert!(selection.has_group(&other));
}

#[test]
fn push_restores_overridden_group_member() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let alice = student(1, Some(10));

    selection.push_group(homeroom.clone());
    selection.pop_student(&alice);
    assert!(!selection.has_student(&alice));

    selection.push_student(alice.clone());

    assert!(selection.has_student(&alice));
    // Back to plain group membership, no explicit entry.
    assert!(!selection.has_student_explicit(alice.id));
}

#[test]
fn toggle_student_flips_effective_selection() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");
    let alice = student(1, Some(10));

    selection.toggle_student(&alice);
    assert!(selection.has_student(&alice));
    selection.toggle_student(&alice);
    assert!(!selection.has_student(&alice));

    selection.push_group(homeroom.clone());
    selection.toggle_student(&alice);
    assert!(selection.is_excluded(alice.id));
    selection.toggle_student(&alice);
    assert!(selection.has_student(&alice));
}

#[test]
fn toggle_group_flips_group_selection() {
    init_logging();
    let mut selection = SelectionSet::new();
    let homeroom = group(10, "Homeroom");

    selection.toggle_group(&homeroom);
    assert!(selection.has_group(&homeroom));
    selection.toggle_group(&homeroom);
    assert!(!selection.has_group(&homeroom));
}

#[test]
fn clear_empties_everything() {
    init_logging();
    let mut selection = SelectionSet::new();
    selection.push_group(group(10, "Homeroom"));
    selection.push_student(student(1, None));

    selection.clear();

    assert!(selection.is_empty());
    assert!(selection.groups().is_empty());
    assert!(selection.students(None).is_empty());
}
