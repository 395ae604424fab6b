//! Domain models for the song library
//!
//! Stored entities ([`Group`], [`Song`], [`SongDetail`]), the read-side
//! projection ([`LibraryEntry`]) and the input shapes accepted by the
//! repository ([`NewSong`], [`SongIdentity`], [`SongChanges`]).

use crate::error::{LibraryError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

// =============================================================================
// ID Types
// =============================================================================

/// Row id of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row id of a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Release Date
// =============================================================================

/// Calendar day a song was released.
///
/// Crosses the API edge as `DD.MM.YYYY` and is stored as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
    /// `DD.MM.YYYY`
    pub const API_FORMAT: &'static str = "%d.%m.%Y";
    /// `YYYY-MM-DD`
    pub const STORAGE_FORMAT: &'static str = "%Y-%m-%d";

    /// Years with a four-digit storage form.
    pub const YEARS: RangeInclusive<i32> = 0..=9999;

    /// # Errors
    ///
    /// [`LibraryError::InvalidData`] if the year is outside [`Self::YEARS`].
    pub fn new(date: NaiveDate) -> Result<Self> {
        if !Self::YEARS.contains(&date.year()) {
            return Err(LibraryError::invalid_data(
                "release_date",
                format!("year {} is outside 0000..=9999", date.year()),
            ));
        }
        Ok(Self(date))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|date| Self::new(date).ok())
    }

    /// Parse the API form, e.g. `31.10.1975`.
    ///
    /// # Errors
    ///
    /// [`LibraryError::InvalidData`] naming `release_date`.
    pub fn parse(text: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(text.trim(), Self::API_FORMAT).map_err(|e| {
            LibraryError::invalid_data(
                "release_date",
                format!("expected DD.MM.YYYY, got '{}': {}", text, e),
            )
        })?;
        Self::new(date)
    }

    /// Parse the stored form. A failure here means the row is corrupt.
    pub fn from_storage(text: &str) -> Result<Self> {
        NaiveDate::parse_from_str(text, Self::STORAGE_FORMAT)
            .map(Self)
            .map_err(|e| {
                LibraryError::Storage(format!("corrupt release_date '{}': {}", text, e))
            })
    }

    pub fn to_storage(&self) -> String {
        self.0.format(Self::STORAGE_FORMAT).to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::API_FORMAT))
    }
}

impl FromStr for ReleaseDate {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<NaiveDate> for ReleaseDate {
    type Error = LibraryError;

    fn try_from(date: NaiveDate) -> Result<Self> {
        Self::new(date)
    }
}

impl Serialize for ReleaseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Stored Entities
// =============================================================================

/// Performing artist or band. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A title scoped to a group. `(group_id, title)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub group_id: GroupId,
    pub title: String,
}

/// Lyrics, source URL and release date of exactly one song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    pub song_id: SongId,
    pub lyrics: String,
    pub url: String,
    pub release_date: ReleaseDate,
}

/// Read-side projection joining group, song and detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub group: String,
    #[serde(rename = "song")]
    pub title: String,
    pub release_date: ReleaseDate,
}

// =============================================================================
// Inputs
// =============================================================================

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if is_blank(value) {
        return Err(LibraryError::invalid_data(field, "must not be empty"));
    }
    Ok(())
}

/// Everything needed to add a song with its detail row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub group: String,
    #[serde(rename = "song")]
    pub title: String,
    pub lyrics: String,
    pub url: String,
    pub release_date: ReleaseDate,
}

impl NewSong {
    pub fn new(
        group: impl Into<String>,
        title: impl Into<String>,
        lyrics: impl Into<String>,
        url: impl Into<String>,
        release_date: ReleaseDate,
    ) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            lyrics: lyrics.into(),
            url: url.into(),
            release_date,
        }
    }

    /// Rejects empty group, title, lyrics or url.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("group", &self.group)?;
        require_non_empty("song", &self.title)?;
        require_non_empty("lyrics", &self.lyrics)?;
        require_non_empty("url", &self.url)?;
        Ok(())
    }
}

/// Natural key of a song: group name plus title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongIdentity {
    pub group: String,
    #[serde(rename = "song")]
    pub title: String,
}

impl SongIdentity {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("group", &self.group)?;
        require_non_empty("song", &self.title)?;
        Ok(())
    }
}

impl fmt::Display for SongIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by '{}'", self.title, self.group)
    }
}

/// Partial update of a song. Absent fields keep their stored value; empty or
/// whitespace-only strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongChanges {
    #[serde(default, rename = "new_group")]
    pub group: Option<String>,
    #[serde(default, rename = "new_name")]
    pub title: Option<String>,
    #[serde(default, rename = "new_text")]
    pub lyrics: Option<String>,
    #[serde(default, rename = "new_url")]
    pub url: Option<String>,
    #[serde(
        default,
        rename = "new_release_date",
        deserialize_with = "blank_date_as_none"
    )]
    pub release_date: Option<ReleaseDate>,
}

fn blank_date_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<ReleaseDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !is_blank(&text) => ReleaseDate::parse(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl SongChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn release_date(mut self, date: ReleaseDate) -> Self {
        self.release_date = Some(date);
        self
    }

    /// Drops blank strings so later stages only see real changes.
    pub fn normalized(self) -> Self {
        let keep = |value: Option<String>| value.filter(|v| !is_blank(v));
        Self {
            group: keep(self.group),
            title: keep(self.title),
            lyrics: keep(self.lyrics),
            url: keep(self.url),
            release_date: self.release_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.as_deref().map_or(true, is_blank)
            && self.title.as_deref().map_or(true, is_blank)
            && self.lyrics.as_deref().map_or(true, is_blank)
            && self.url.as_deref().map_or(true, is_blank)
            && self.release_date.is_none()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
