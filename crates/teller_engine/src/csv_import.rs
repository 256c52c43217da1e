use std::collections::HashSet;

use engine_logging::engine_debug;
use teller_core::{GroupId, GroupRef};

use crate::backend::{BackendError, IdentifierLookup, NewStudentRequest};

#[derive(Debug, Clone)]
pub struct CsvImportSettings {
    /// Columns every row must fill in; a row missing any of them is dropped.
    pub required_columns: Vec<String>,
    /// Account numbers are zero-padded to this width before dedupe.
    pub account_pad_width: usize,
}

impl Default for CsvImportSettings {
    fn default() -> Self {
        Self {
            required_columns: ["account_number", "email", "first_name", "last_name", "group"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            account_pad_width: 10,
        }
    }
}

/// Result of a roster parse: creation-ready requests, groups the backend
/// does not know yet, and a non-fatal error log for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterImport {
    pub validated: Vec<NewStudentRequest>,
    pub pending_groups: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CsvImportError {
    /// The file is not a roster CSV at all; nothing was imported.
    #[error("the file does not look like a valid roster: {0}")]
    Format(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Parses raw CSV text into validated creation requests.
///
/// Rows with missing required fields are dropped whole. Duplicate account
/// numbers inside the file keep their first occurrence; account numbers the
/// backend already knows (looked up in the groups named by the file) win
/// over the import. Every dropped row leaves a line-numbered message in
/// `errors`.
pub async fn parse_roster<L>(
    text: &str,
    settings: &CsvImportSettings,
    existing_groups: &[GroupRef],
    lookup: &L,
) -> Result<RosterImport, CsvImportError>
where
    L: IdentifierLookup + ?Sized,
{
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|error| CsvImportError::Format(error.to_string()))?
        .clone();
    for column in &settings.required_columns {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(CsvImportError::Format(format!(
                "missing required column '{column}'"
            )));
        }
    }
    let column_index = |name: &str| headers.iter().position(|header| header.trim() == name);

    let mut errors = Vec::new();
    let mut total_rows = 0usize;
    let mut seen_accounts = HashSet::new();
    let mut survivors: Vec<(usize, NewStudentRequest)> = Vec::new();

    for (index, record) in reader.records().enumerate() {
        // Line 1 is the header row.
        let line = index + 2;
        total_rows += 1;
        let record = match record {
            Ok(record) => record,
            Err(error) if index == 0 => return Err(CsvImportError::Format(error.to_string())),
            Err(error) => {
                errors.push(format!("Line {line}: row could not be read ({error})."));
                continue;
            }
        };

        let field = |name: &str| -> String {
            column_index(name)
                .and_then(|position| record.get(position))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let mut missing = false;
        for column in &settings.required_columns {
            if field(column).is_empty() {
                errors.push(format!(
                    "Line {line}: {column} is a required field and cannot be empty."
                ));
                missing = true;
            }
        }
        if missing {
            continue;
        }

        // Pad before duplicate detection so 42 and 0000000042 collide.
        let account_number = pad_account(&field("account_number"), settings.account_pad_width);
        if !seen_accounts.insert(account_number.clone()) {
            errors.push(format!(
                "Line {line}: account number {account_number} appears earlier in the file; \
                 keeping the first occurrence."
            ));
            continue;
        }

        survivors.push((
            line,
            NewStudentRequest {
                account_number,
                email: field("email"),
                first_name: field("first_name"),
                last_name: field("last_name"),
                group_name: field("group"),
            },
        ));
    }

    // Existing records win over the import. Only groups the backend already
    // knows can hold colliding accounts, so the lookup is scoped to them.
    let file_group_keys: HashSet<String> = survivors
        .iter()
        .map(|(_, request)| request.group_name.to_lowercase())
        .collect();
    let known_ids: Vec<GroupId> = existing_groups
        .iter()
        .filter(|group| file_group_keys.contains(&group.name.to_lowercase()))
        .map(|group| group.id)
        .collect();
    let existing_accounts: HashSet<String> = if known_ids.is_empty() {
        HashSet::new()
    } else {
        lookup
            .fetch_existing_identifiers(&known_ids)
            .await?
            .into_iter()
            .collect()
    };

    let mut validated = Vec::new();
    for (line, request) in survivors {
        if existing_accounts.contains(&request.account_number) {
            errors.push(format!(
                "Line {line}: account number {} already exists and was skipped.",
                request.account_number
            ));
        } else {
            validated.push(request);
        }
    }

    let existing_names: HashSet<String> = existing_groups
        .iter()
        .map(|group| group.name.to_lowercase())
        .collect();
    let mut pending_seen = HashSet::new();
    let mut pending_groups = Vec::new();
    for request in &validated {
        let key = request.group_name.to_lowercase();
        if !existing_names.contains(&key) && pending_seen.insert(key) {
            pending_groups.push(request.group_name.clone());
        }
    }

    if validated.len() < total_rows {
        errors.push(format!(
            "{} of {total_rows} rows are ready to import; see the messages above.",
            validated.len()
        ));
    }

    engine_debug!(
        "roster parse: {} of {} rows validated, {} pending groups, {} messages",
        validated.len(),
        total_rows,
        pending_groups.len(),
        errors.len()
    );

    Ok(RosterImport {
        validated,
        pending_groups,
        errors,
    })
}

fn pad_account(raw: &str, width: usize) -> String {
    format!("{raw:0>width$}")
}
