//! Library repository trait and implementation
//!
//! Every operation runs in exactly one transaction: it either commits as a
//! whole or leaves nothing behind.

use super::{group, song};
use super::pagination::{validate_page, LibraryPage, Page, PageRequest};
use crate::error::{LibraryError, Result};
use crate::models::{LibraryEntry, NewSong, ReleaseDate, SongChanges, SongIdentity};
use crate::query::{render_library_query, LibraryFilter};
use crate::transaction::{finish, with_deadline};
use bridge_traits::database::{DatabaseAdapter, DatabaseTransaction, QueryRow, RowExt};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Library repository interface
#[async_trait::async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Add a song with its lyrics, url and release date, creating the group
    /// on first reference.
    ///
    /// # Errors
    /// - `InvalidData` if group, title, lyrics or url is empty
    /// - `Conflict` if the group already has a song with this title, or a
    ///   concurrent writer created the same group first
    async fn add_song(&self, song: &NewSong) -> Result<()>;

    /// Lyrics of one song.
    ///
    /// # Errors
    /// - `GroupNotFound` if no group has this name
    /// - `SongNotFound` if the group has no song with this title
    async fn get_song_text(&self, identity: &SongIdentity) -> Result<String>;

    /// Delete one song and its detail. The group stays.
    ///
    /// # Errors
    /// - `GroupNotFound` if no group has this name
    /// - `SongNotFound` if nothing was deleted
    async fn delete_song(&self, identity: &SongIdentity) -> Result<()>;

    /// One page of entries matching `filter`, ordered by group, title and
    /// release date.
    ///
    /// # Errors
    /// - `InvalidArgument` for a zero page size
    /// - `PageOutOfBounds` if the page index is past the last page
    async fn get_filtered(&self, filter: &LibraryFilter, page: PageRequest)
        -> Result<LibraryPage>;

    /// Apply a partial update. Absent or empty fields keep their value; an
    /// update without any field is a successful no-op.
    ///
    /// # Errors
    /// - `InvalidData` if the identity has an empty field
    /// - `SongNotFound` if the identity names no song
    /// - `Conflict` if the new identity is already taken
    async fn update_song(&self, identity: &SongIdentity, changes: SongChanges) -> Result<()>;
}

/// SQLite implementation of LibraryRepository
pub struct SqliteLibraryRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    operation_timeout: Option<Duration>,
}

impl SqliteLibraryRepository {
    /// Create a new library repository with the given database adapter
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            operation_timeout: None,
        }
    }

    /// Create a new library repository from a SQLite connection pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        use crate::adapters::SqliteAdapter;
        Self::new(Arc::new(SqliteAdapter::from_pool(pool)))
    }

    /// Bound every operation by `timeout`. An operation that runs longer is
    /// rolled back and fails with `DeadlineExceeded`.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    async fn add_song_in(tx: &mut dyn DatabaseTransaction, new_song: &NewSong) -> Result<()> {
        let group_id = group::resolve_group(tx, &new_song.group).await?;
        let song_id = song::insert_song(tx, group_id, &new_song.title).await?;
        song::insert_detail(
            tx,
            song_id,
            &new_song.lyrics,
            &new_song.url,
            new_song.release_date,
        )
        .await
    }

    async fn get_song_text_in(
        tx: &mut dyn DatabaseTransaction,
        identity: &SongIdentity,
    ) -> Result<String> {
        let group_id = group::require_group(tx, &identity.group).await?;
        song::find_lyrics(tx, group_id, &identity.title)
            .await?
            .ok_or_else(|| song_not_found(identity))
    }

    async fn delete_song_in(
        tx: &mut dyn DatabaseTransaction,
        identity: &SongIdentity,
    ) -> Result<()> {
        let group_id = group::require_group(tx, &identity.group).await?;
        let deleted = song::delete_song(tx, group_id, &identity.title).await?;
        if deleted == 0 {
            return Err(song_not_found(identity));
        }
        Ok(())
    }

    async fn get_filtered_in(
        tx: &mut dyn DatabaseTransaction,
        filter: &LibraryFilter,
        page: PageRequest,
    ) -> Result<LibraryPage> {
        let query = render_library_query(filter, page);
        debug!(sql = %query.page.sql, "resulting query");

        let total = tx
            .query_optional(&query.count.sql, &query.count.params)
            .await?
            .ok_or_else(|| LibraryError::NoOutputRow("library row count".to_string()))?
            .get_i64("total")?;
        let total = u64::try_from(total)
            .map_err(|_| LibraryError::Storage(format!("negative row count {}", total)))?;

        let page_count = validate_page(total, page)?;

        let rows = tx.query(&query.page.sql, &query.page.params).await?;
        let entries = rows
            .iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(entries, page.page, page_count))
    }

    async fn update_song_in(
        tx: &mut dyn DatabaseTransaction,
        identity: &SongIdentity,
        changes: &SongChanges,
    ) -> Result<()> {
        let song_id = song::find_song_id(tx, &identity.group, &identity.title)
            .await?
            .ok_or_else(|| song_not_found(identity))?;

        let new_group = match changes.group.as_deref() {
            Some(name) => Some(group::resolve_group(tx, name).await?),
            None => None,
        };

        song::apply_changes(tx, song_id, new_group, changes).await
    }
}

fn song_not_found(identity: &SongIdentity) -> LibraryError {
    LibraryError::SongNotFound {
        group: identity.group.clone(),
        title: identity.title.clone(),
    }
}

fn row_to_entry(row: &QueryRow) -> Result<LibraryEntry> {
    Ok(LibraryEntry {
        group: row.get_string("name")?,
        title: row.get_string("song_name")?,
        release_date: ReleaseDate::from_storage(&row.get_string("release_date")?)?,
    })
}

#[async_trait::async_trait]
impl LibraryRepository for SqliteLibraryRepository {
    #[instrument(skip_all, fields(group = %new_song.group, song = %new_song.title))]
    async fn add_song(&self, new_song: &NewSong) -> Result<()> {
        new_song.validate()?;
        info!("adding song");

        with_deadline(self.operation_timeout, async {
            let mut tx = self.adapter.begin().await?;
            let outcome = Self::add_song_in(tx.as_mut(), new_song).await;
            finish(tx, outcome).await
        })
        .await?;

        info!("song successfully added");
        Ok(())
    }

    #[instrument(skip_all, fields(group = %identity.group, song = %identity.title))]
    async fn get_song_text(&self, identity: &SongIdentity) -> Result<String> {
        identity.validate()?;

        with_deadline(self.operation_timeout, async {
            let mut tx = self.adapter.begin().await?;
            let outcome = Self::get_song_text_in(tx.as_mut(), identity).await;
            finish(tx, outcome).await
        })
        .await
    }

    #[instrument(skip_all, fields(group = %identity.group, song = %identity.title))]
    async fn delete_song(&self, identity: &SongIdentity) -> Result<()> {
        identity.validate()?;

        with_deadline(self.operation_timeout, async {
            let mut tx = self.adapter.begin().await?;
            let outcome = Self::delete_song_in(tx.as_mut(), identity).await;
            finish(tx, outcome).await
        })
        .await?;

        info!("deletion successful");
        Ok(())
    }

    #[instrument(skip_all, fields(page = page.page, page_size = page.page_size))]
    async fn get_filtered(
        &self,
        filter: &LibraryFilter,
        page: PageRequest,
    ) -> Result<LibraryPage> {
        page.validate()?;

        let result = with_deadline(self.operation_timeout, async {
            let mut tx = self.adapter.begin().await?;
            let outcome = Self::get_filtered_in(tx.as_mut(), filter, page).await;
            finish(tx, outcome).await
        })
        .await?;

        debug!(
            entries = result.entries.len(),
            page_count = result.page_count,
            "library page fetched"
        );
        Ok(result)
    }

    #[instrument(skip_all, fields(group = %identity.group, song = %identity.title))]
    async fn update_song(&self, identity: &SongIdentity, changes: SongChanges) -> Result<()> {
        identity.validate()?;

        let changes = changes.normalized();
        if changes.is_empty() {
            info!("empty update");
            return Ok(());
        }

        with_deadline(self.operation_timeout, async {
            let mut tx = self.adapter.begin().await?;
            let outcome = Self::update_song_in(tx.as_mut(), identity, &changes).await;
            finish(tx, outcome).await
        })
        .await?;

        info!("update successful");
        Ok(())
    }
}
