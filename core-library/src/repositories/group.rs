//! Group resolution inside an open transaction
//!
//! A group is created the first time a song references its name and is
//! never deleted afterwards.

use crate::error::{LibraryError, Result};
use crate::models::GroupId;
use bridge_traits::database::{DatabaseTransaction, QueryValue, RowExt};
use tracing::debug;

const FIND_GROUP: &str = "SELECT id FROM groups WHERE name = ?1 LIMIT 1";
const INSERT_GROUP: &str = "INSERT INTO groups (name) VALUES (?1) RETURNING id";

/// Looks a group up by exact name.
pub async fn find_group_id(
    tx: &mut dyn DatabaseTransaction,
    name: &str,
) -> Result<Option<GroupId>> {
    let row = tx
        .query_optional(FIND_GROUP, &[QueryValue::from(name)])
        .await?;

    match row {
        Some(row) => Ok(Some(GroupId(row.get_i64("id")?))),
        None => Ok(None),
    }
}

/// Like [`find_group_id`] but a missing group is [`LibraryError::GroupNotFound`].
pub async fn require_group(tx: &mut dyn DatabaseTransaction, name: &str) -> Result<GroupId> {
    find_group_id(tx, name)
        .await?
        .ok_or_else(|| LibraryError::GroupNotFound {
            group: name.to_string(),
        })
}

/// Get-or-create: returns the id of the group named `name`, inserting it
/// when absent.
///
/// Both steps run on `tx`, so a group created here disappears again if the
/// surrounding operation rolls back. Two transactions introducing the same
/// new name concurrently can both miss the lookup; the loser's insert hits
/// the unique index and comes back as [`LibraryError::Conflict`].
pub async fn resolve_group(tx: &mut dyn DatabaseTransaction, name: &str) -> Result<GroupId> {
    if let Some(id) = find_group_id(tx, name).await? {
        return Ok(id);
    }

    debug!(group = %name, "group not found, adding it");

    let row = tx
        .query_optional(INSERT_GROUP, &[QueryValue::from(name)])
        .await?
        .ok_or_else(|| LibraryError::NoOutputRow(format!("insert of group '{}'", name)))?;

    Ok(GroupId(row.get_i64("id")?))
}
