//! Song and song-detail statements inside an open transaction

use crate::error::{LibraryError, Result};
use crate::models::{GroupId, ReleaseDate, SongChanges, SongId};
use crate::query::{render_update, Assignment, Column, RenderedQuery, UpdateTarget};
use bridge_traits::database::{DatabaseTransaction, QueryValue, RowExt};
use tracing::debug;

const INSERT_SONG: &str = "INSERT INTO songs (group_id, song_name) VALUES (?1, ?2) RETURNING id";

const INSERT_DETAIL: &str =
    "INSERT INTO song_info (song_id, lyrics, url, release_date) VALUES (?1, ?2, ?3, ?4)";

const FIND_SONG_BY_NAMES: &str = "SELECT songs.id AS id FROM songs \
     JOIN groups ON groups.id = songs.group_id \
     WHERE groups.name = ?1 AND songs.song_name = ?2";

const FIND_LYRICS: &str = "SELECT song_info.lyrics AS lyrics FROM song_info \
     JOIN songs ON songs.id = song_info.song_id \
     WHERE songs.group_id = ?1 AND songs.song_name = ?2";

const DELETE_SONG: &str = "DELETE FROM songs WHERE group_id = ?1 AND song_name = ?2";

/// Inserts a song row and returns its id.
pub async fn insert_song(
    tx: &mut dyn DatabaseTransaction,
    group_id: GroupId,
    title: &str,
) -> Result<SongId> {
    let row = tx
        .query_optional(
            INSERT_SONG,
            &[QueryValue::Integer(group_id.0), QueryValue::from(title)],
        )
        .await?
        .ok_or_else(|| LibraryError::NoOutputRow(format!("insert of song '{}'", title)))?;

    Ok(SongId(row.get_i64("id")?))
}

/// Inserts the detail row belonging to `song_id`.
pub async fn insert_detail(
    tx: &mut dyn DatabaseTransaction,
    song_id: SongId,
    lyrics: &str,
    url: &str,
    release_date: ReleaseDate,
) -> Result<()> {
    let affected = tx
        .execute(
            INSERT_DETAIL,
            &[
                QueryValue::Integer(song_id.0),
                QueryValue::from(lyrics),
                QueryValue::from(url),
                QueryValue::Text(release_date.to_storage()),
            ],
        )
        .await?;

    if affected != 1 {
        return Err(LibraryError::NoOutputRow(format!(
            "insert of detail for song {}",
            song_id
        )));
    }
    Ok(())
}

/// Resolves the natural key `(group name, title)` to the song's id.
pub async fn find_song_id(
    tx: &mut dyn DatabaseTransaction,
    group: &str,
    title: &str,
) -> Result<Option<SongId>> {
    let row = tx
        .query_optional(
            FIND_SONG_BY_NAMES,
            &[QueryValue::from(group), QueryValue::from(title)],
        )
        .await?;

    match row {
        Some(row) => Ok(Some(SongId(row.get_i64("id")?))),
        None => Ok(None),
    }
}

/// Lyrics of the song titled `title` within `group_id`.
pub async fn find_lyrics(
    tx: &mut dyn DatabaseTransaction,
    group_id: GroupId,
    title: &str,
) -> Result<Option<String>> {
    let row = tx
        .query_optional(
            FIND_LYRICS,
            &[QueryValue::Integer(group_id.0), QueryValue::from(title)],
        )
        .await?;

    match row {
        Some(row) => Ok(Some(row.get_string("lyrics")?)),
        None => Ok(None),
    }
}

/// Deletes a song; its detail row goes with it through `ON DELETE CASCADE`.
///
/// Returns the number of song rows removed.
pub async fn delete_song(
    tx: &mut dyn DatabaseTransaction,
    group_id: GroupId,
    title: &str,
) -> Result<u64> {
    Ok(tx
        .execute(
            DELETE_SONG,
            &[QueryValue::Integer(group_id.0), QueryValue::from(title)],
        )
        .await?)
}

/// `SET` list for the `songs` table.
fn song_assignments(new_group: Option<GroupId>, changes: &SongChanges) -> Vec<Assignment> {
    let mut assignments = Vec::with_capacity(2);
    if let Some(group_id) = new_group {
        assignments.push(Assignment::new(Column::GroupId, group_id.0));
    }
    if let Some(title) = &changes.title {
        assignments.push(Assignment::new(Column::SongTitle, title.as_str()));
    }
    assignments
}

/// `SET` list for the `song_info` table.
fn detail_assignments(changes: &SongChanges) -> Vec<Assignment> {
    let mut assignments = Vec::with_capacity(3);
    if let Some(lyrics) = &changes.lyrics {
        assignments.push(Assignment::new(Column::Lyrics, lyrics.as_str()));
    }
    if let Some(url) = &changes.url {
        assignments.push(Assignment::new(Column::Url, url.as_str()));
    }
    if let Some(date) = changes.release_date {
        assignments.push(Assignment::new(Column::ReleaseDate, date.to_storage()));
    }
    assignments
}

async fn run_update(tx: &mut dyn DatabaseTransaction, rendered: RenderedQuery) -> Result<u64> {
    debug!(sql = %rendered.sql, "resulting query");
    Ok(tx.execute(&rendered.sql, &rendered.params).await?)
}

/// Applies the normalized `changes` to one song as two independent
/// statements, one per table. A table with nothing to change is skipped.
///
/// `new_group` is the already resolved id of `changes.group`.
pub async fn apply_changes(
    tx: &mut dyn DatabaseTransaction,
    song_id: SongId,
    new_group: Option<GroupId>,
    changes: &SongChanges,
) -> Result<()> {
    let song_update = render_update(
        UpdateTarget::Song,
        &song_assignments(new_group, changes),
        song_id,
    );
    if let Some(rendered) = song_update {
        run_update(tx, rendered).await?;
    }

    let detail_update = render_update(
        UpdateTarget::SongDetail,
        &detail_assignments(changes),
        song_id,
    );
    if let Some(rendered) = detail_update {
        run_update(tx, rendered).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_assignments_order() {
        let changes = SongChanges::new().title("Rhap").group("Muse");
        let assignments = song_assignments(Some(GroupId(2)), &changes);

        assert_eq!(
            assignments,
            vec![
                Assignment::new(Column::GroupId, 2_i64),
                Assignment::new(Column::SongTitle, "Rhap"),
            ]
        );
    }

    #[test]
    fn test_detail_assignments_store_date_in_storage_form() {
        let date = ReleaseDate::from_ymd(1975, 11, 1).unwrap();
        let changes = SongChanges::new().release_date(date).lyrics("la");
        let assignments = detail_assignments(&changes);

        assert_eq!(
            assignments,
            vec![
                Assignment::new(Column::Lyrics, "la"),
                Assignment::new(Column::ReleaseDate, "1975-11-01"),
            ]
        );
    }

    #[test]
    fn test_untouched_tables_have_no_assignments() {
        let changes = SongChanges::new().url("http://y");
        assert!(song_assignments(None, &changes).is_empty());
        assert_eq!(detail_assignments(&changes).len(), 1);
    }
}
