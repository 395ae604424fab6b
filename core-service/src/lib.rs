//! Core service façade and bootstrap helpers.
//!
//! [`CoreService`] is built once, from a [`ServiceConfig`] or from explicit
//! dependencies, and handed by reference to whatever transport hosts it.
//! Desktop builds enable the `desktop-shims` feature (the default), which
//! brings in `bridge-desktop` for the HTTP client used by the song-info
//! lookup.

pub mod error;
pub mod verse;

pub use error::{CoreError, Result};
pub use verse::VersePage;

use std::sync::Arc;

use bridge_traits::database::DatabaseAdapter;
use core_library::{
    LibraryFilter, LibraryPage, LibraryRepository, PageRequest, SongChanges, SongIdentity,
};
use core_metadata::{SongInfoProvider, SongInfoQuery};
use core_runtime::config::DEFAULT_PAGE_SIZE;
use tracing::info;

#[cfg(feature = "desktop-shims")]
pub use desktop::{bootstrap, start};

/// Aggregated handle to everything the service delegates to.
pub struct CoreDependencies {
    pub database: Arc<dyn DatabaseAdapter>,
    pub library: Arc<dyn LibraryRepository>,
    pub song_info: Arc<dyn SongInfoProvider>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        database: Arc<dyn DatabaseAdapter>,
        library: Arc<dyn LibraryRepository>,
        song_info: Arc<dyn SongInfoProvider>,
    ) -> Self {
        Self {
            database,
            library,
            song_info,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    default_page_size: u32,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used by [`browse`](Self::browse) when the caller gives none.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Access the dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Look the song up in the song-info service and add it to the library.
    pub async fn add_song(&self, identity: &SongIdentity) -> Result<()> {
        identity.validate()?;

        let query = SongInfoQuery::new(identity.group.clone(), identity.title.clone());
        let details = self.deps.song_info.fetch(&query).await?;
        self.deps
            .library
            .add_song(&details.into_new_song(&query))
            .await?;

        info!(group = %identity.group, song = %identity.title, "success");
        Ok(())
    }

    /// One page of the library; absent paging arguments fall back to the
    /// first page and the default page size.
    pub async fn browse(
        &self,
        filter: &LibraryFilter,
        page_index: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<LibraryPage> {
        let page = PageRequest::new(
            page_index.unwrap_or(0),
            page_size.unwrap_or(self.default_page_size),
        );
        Ok(self.deps.library.get_filtered(filter, page).await?)
    }

    /// Full lyrics of one song.
    pub async fn song_text(&self, identity: &SongIdentity) -> Result<String> {
        Ok(self.deps.library.get_song_text(identity).await?)
    }

    /// One verse of a song's lyrics, first verse by default.
    pub async fn song_verse(
        &self,
        identity: &SongIdentity,
        verse_index: Option<u32>,
    ) -> Result<VersePage> {
        let text = self.deps.library.get_song_text(identity).await?;
        Ok(verse::verse_page(&text, verse_index.unwrap_or(0))?)
    }

    pub async fn delete_song(&self, identity: &SongIdentity) -> Result<()> {
        Ok(self.deps.library.delete_song(identity).await?)
    }

    pub async fn update_song(&self, identity: &SongIdentity, changes: SongChanges) -> Result<()> {
        Ok(self.deps.library.update_song(identity, changes).await?)
    }

    /// Close the database pool. Operations after this fail.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutting down");
        self.deps.database.close().await?;
        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
mod desktop {
    use super::*;
    use bridge_desktop::ReqwestHttpClient;
    use bridge_traits::http::HttpClient;
    use core_library::{
        create_pool, DatabaseConfig, MigrationSource, SqliteAdapter, SqliteLibraryRepository,
    };
    use core_metadata::HttpSongInfoProvider;
    use core_runtime::config::ServiceConfig;
    use core_runtime::logging::init_logging;
    use std::path::Path;

    /// Wire a service from configuration: pool and migrations, SQLite
    /// adapter, reqwest client and the HTTP song-info provider.
    ///
    /// ```rust,ignore
    /// let config = ServiceConfig::from_env_file("config.env")?;
    /// let core = core_service::bootstrap(&config).await?;
    /// ```
    pub async fn bootstrap(config: &ServiceConfig) -> Result<CoreService> {
        config.validate()?;

        let migrations = match &config.migrations_path {
            Some(path) => MigrationSource::Directory(path.clone()),
            None => MigrationSource::Embedded,
        };
        let db_config = DatabaseConfig::from_url(config.database_url.clone())
            .max_connections(config.max_connections)
            .migrations(migrations);
        let pool = create_pool(db_config).await?;
        let database: Arc<dyn DatabaseAdapter> = Arc::new(SqliteAdapter::from_pool(pool));

        let mut repository = SqliteLibraryRepository::new(Arc::clone(&database));
        if let Some(timeout) = config.operation_timeout {
            repository = repository.with_operation_timeout(timeout);
        }

        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
        let song_info = HttpSongInfoProvider::new(http_client, config.song_info_url.clone());

        info!(
            database_url = %config.database_url,
            song_info_url = %config.song_info_url,
            "core service ready"
        );

        Ok(CoreService::new(CoreDependencies::new(
            database,
            Arc::new(repository),
            Arc::new(song_info),
        ))
        .with_default_page_size(config.default_page_size))
    }

    /// Process entry point: read the env file (`./config.env` when `None`),
    /// install logging, then [`bootstrap`].
    pub async fn start(env_file: Option<&Path>) -> Result<CoreService> {
        let config = match env_file {
            Some(path) => ServiceConfig::from_env_file(path)?,
            None => ServiceConfig::from_default_env_file()?,
        };
        init_logging(config.logging_config())?;
        bootstrap(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::DatabaseTransaction;
    use core_library::{LibraryError, NewSong, ReleaseDate};
    use core_metadata::{MetadataError, SongDetails};
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        pub Library {}

        #[async_trait::async_trait]
        impl LibraryRepository for Library {
            async fn add_song(&self, song: &NewSong) -> core_library::Result<()>;
            async fn get_song_text(&self, identity: &SongIdentity) -> core_library::Result<String>;
            async fn delete_song(&self, identity: &SongIdentity) -> core_library::Result<()>;
            async fn get_filtered(
                &self,
                filter: &LibraryFilter,
                page: PageRequest,
            ) -> core_library::Result<LibraryPage>;
            async fn update_song(
                &self,
                identity: &SongIdentity,
                changes: SongChanges,
            ) -> core_library::Result<()>;
        }
    }

    mock! {
        pub SongInfo {}

        #[async_trait::async_trait]
        impl SongInfoProvider for SongInfo {
            async fn fetch(&self, query: &SongInfoQuery) -> core_metadata::Result<SongDetails>;
        }
    }

    mock! {
        pub Database {}

        #[async_trait::async_trait]
        impl DatabaseAdapter for Database {
            async fn begin(&self) -> BridgeResult<Box<dyn DatabaseTransaction>>;
            async fn health_check(&self) -> BridgeResult<()>;
            async fn close(&self) -> BridgeResult<()>;
        }
    }

    fn service(library: MockLibrary, song_info: MockSongInfo) -> CoreService {
        CoreService::new(CoreDependencies::new(
            Arc::new(MockDatabase::new()),
            Arc::new(library),
            Arc::new(song_info),
        ))
    }

    fn queen() -> SongIdentity {
        SongIdentity::new("Queen", "Bohemian Rhapsody")
    }

    #[core_async::test]
    async fn test_add_song_uses_fetched_details() {
        let mut song_info = MockSongInfo::new();
        song_info
            .expect_fetch()
            .with(eq(SongInfoQuery::new("Queen", "Bohemian Rhapsody")))
            .times(1)
            .returning(|_| {
                Ok(SongDetails {
                    lyrics: "Is this the real life?".into(),
                    url: "http://x".into(),
                    release_date: ReleaseDate::from_ymd(1975, 10, 31).unwrap(),
                })
            });

        let mut library = MockLibrary::new();
        library
            .expect_add_song()
            .withf(|song| {
                song.group == "Queen"
                    && song.title == "Bohemian Rhapsody"
                    && song.lyrics == "Is this the real life?"
                    && song.release_date.to_string() == "31.10.1975"
            })
            .times(1)
            .returning(|_| Ok(()));

        service(library, song_info).add_song(&queen()).await.unwrap();
    }

    #[core_async::test]
    async fn test_add_song_stops_on_lookup_failure() {
        let mut song_info = MockSongInfo::new();
        song_info
            .expect_fetch()
            .returning(|_| Err(MetadataError::InvalidSongInfo("song text empty".into())));
        let mut library = MockLibrary::new();
        library.expect_add_song().never();

        let err = service(library, song_info)
            .add_song(&queen())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Metadata(_)));
    }

    #[core_async::test]
    async fn test_add_song_rejects_empty_identity_before_lookup() {
        let mut song_info = MockSongInfo::new();
        song_info.expect_fetch().never();

        let err = service(MockLibrary::new(), song_info)
            .add_song(&SongIdentity::new("Queen", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Library(LibraryError::InvalidData { .. })
        ));
    }

    #[core_async::test]
    async fn test_browse_applies_default_page_size() {
        let mut library = MockLibrary::new();
        library
            .expect_get_filtered()
            .with(always(), eq(PageRequest::new(0, 20)))
            .times(1)
            .returning(|_, _| Ok(LibraryPage::new(Vec::new(), 0, 0)));
        library
            .expect_get_filtered()
            .with(always(), eq(PageRequest::new(3, 5)))
            .times(1)
            .returning(|_, _| Ok(LibraryPage::new(Vec::new(), 3, 4)));

        let core = service(library, MockSongInfo::new());
        core.browse(&LibraryFilter::new(), None, None).await.unwrap();
        let page = core
            .browse(&LibraryFilter::new(), Some(3), Some(5))
            .await
            .unwrap();
        assert_eq!(page.page_count, 4);
    }

    #[core_async::test]
    async fn test_song_verse_pages_lyrics() {
        let mut library = MockLibrary::new();
        library
            .expect_get_song_text()
            .returning(|_| Ok("first\nverse\n\nsecond verse".to_string()));

        let core = service(library, MockSongInfo::new());

        let first = core.song_verse(&queen(), None).await.unwrap();
        assert_eq!(first.verse, "first\nverse");
        assert_eq!(first.page_count, 2);

        let err = core.song_verse(&queen(), Some(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Library(LibraryError::PageOutOfBounds { .. })
        ));
    }

    #[core_async::test]
    async fn test_retryable_errors_pass_through() {
        let mut library = MockLibrary::new();
        library
            .expect_delete_song()
            .returning(|_| Err(LibraryError::Conflict("database is locked".into())));

        let err = service(library, MockSongInfo::new())
            .delete_song(&queen())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[core_async::test]
    async fn test_shutdown_closes_database() {
        let mut database = MockDatabase::new();
        database.expect_close().times(1).returning(|| Ok(()));

        let core = CoreService::new(CoreDependencies::new(
            Arc::new(database),
            Arc::new(MockLibrary::new()),
            Arc::new(MockSongInfo::new()),
        ));
        core.shutdown().await.unwrap();
    }
}
