use rust_decimal::Decimal;

pub type InstanceId = u64;
pub type GroupId = u64;
pub type StudentId = u64;
pub type ShareId = u64;
pub type ShareTypeId = u64;

/// A tenant ("bank instance") that groups and students belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub id: InstanceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTypeRef {
    pub id: ShareTypeId,
    pub name: String,
}

/// A single account ("share") held by a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub id: ShareId,
    pub share_type_id: ShareTypeId,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRef {
    pub id: StudentId,
    pub account_number: String,
    pub first_name: String,
    pub last_name: String,
    /// The owning group, when the student belongs to one.
    pub group_id: Option<GroupId>,
    pub shares: Vec<Share>,
}
