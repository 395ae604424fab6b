//! SQL construction for library reads and partial updates.
//!
//! Callers describe *what* they want as data: a [`LibraryFilter`] becomes an
//! ordered list of [`Predicate`]s, a partial update becomes a list of
//! [`Assignment`]s. One rendering function turns each description into SQL
//! with positional placeholders (`?1`, `?2`, ...) numbered in the order the
//! clauses were appended, so the parameter vector always lines up with the
//! statement.
//!
//! Filter order is fixed: group, then title, then release date.

use crate::models::{ReleaseDate, SongId};
use crate::repositories::PageRequest;
use bridge_traits::database::QueryValue;
use std::fmt::Write as _;

const LIBRARY_JOIN: &str = "FROM groups \
     JOIN songs ON groups.id = songs.group_id \
     JOIN song_info ON songs.id = song_info.song_id";

const LIBRARY_COLUMNS: &str =
    "SELECT groups.name AS name, songs.song_name AS song_name, song_info.release_date AS release_date";

const LIBRARY_ORDER: &str = " ORDER BY name, song_name, release_date";

/// Column the library layer filters on or assigns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    GroupName,
    SongTitle,
    ReleaseDate,
    GroupId,
    Lyrics,
    Url,
}

impl Column {
    /// Qualified name for use in a joined read.
    pub fn qualified(self) -> &'static str {
        match self {
            Column::GroupName => "groups.name",
            Column::SongTitle => "songs.song_name",
            Column::ReleaseDate => "song_info.release_date",
            Column::GroupId => "songs.group_id",
            Column::Lyrics => "song_info.lyrics",
            Column::Url => "song_info.url",
        }
    }

    /// Bare name for use inside a single-table `UPDATE`.
    pub fn bare(self) -> &'static str {
        let qualified = self.qualified();
        qualified
            .split_once('.')
            .map_or(qualified, |(_, column)| column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// SQL `LIKE`; the value is a pattern.
    Like,
    Eq,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Like => "LIKE",
            Operator::Eq => "=",
        }
    }
}

/// One `column OP ?n` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Column,
    pub operator: Operator,
    pub value: QueryValue,
}

/// One `column = ?n` entry of a `SET` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Column,
    pub value: QueryValue,
}

impl Assignment {
    pub fn new(column: Column, value: impl Into<QueryValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Sparse filter over the three library dimensions.
///
/// Group and title match as substrings (`LIKE '%value%'`, so `%` and `_`
/// typed by the caller keep their wildcard meaning). SQLite's `LIKE` folds
/// ASCII case, so `queen` matches `Queen`; non-ASCII letters compare
/// case-sensitively. The release date matches the exact day. Empty strings
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<ReleaseDate>,
}

impl LibraryFilter {
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

    pub fn release_date(mut self, date: ReleaseDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// The filter as ordered predicates: group, title, release date.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(3);

        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            predicates.push(Predicate {
                column: Column::GroupName,
                operator: Operator::Like,
                value: QueryValue::Text(substring_pattern(group)),
            });
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            predicates.push(Predicate {
                column: Column::SongTitle,
                operator: Operator::Like,
                value: QueryValue::Text(substring_pattern(title)),
            });
        }
        if let Some(date) = self.release_date {
            predicates.push(Predicate {
                column: Column::ReleaseDate,
                operator: Operator::Eq,
                value: QueryValue::Text(date.to_storage()),
            });
        }

        predicates
    }
}

fn substring_pattern(value: &str) -> String {
    format!("%{}%", value)
}

/// SQL text plus the parameters its placeholders refer to, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

/// Count and page statements sharing one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryQuery {
    /// Yields a single `total` column.
    pub count: RenderedQuery,
    /// Yields `name`, `song_name`, `release_date` rows for one page.
    pub page: RenderedQuery,
}

/// Renders `WHERE a ?1 AND b ?2 ...`, numbering from `?1`.
fn render_where(predicates: &[Predicate]) -> (String, Vec<QueryValue>) {
    let mut clause = String::from(" WHERE ");
    let mut params = Vec::with_capacity(predicates.len());

    for (index, predicate) in predicates.iter().enumerate() {
        if index > 0 {
            clause.push_str(" AND ");
        }
        let _ = write!(
            clause,
            "{} {} ?{}",
            predicate.column.qualified(),
            predicate.operator.as_sql(),
            index + 1
        );
        params.push(predicate.value.clone());
    }

    (clause, params)
}

/// Builds the count and page statements for `filter`.
///
/// An empty filter produces the unfiltered statements, which carry no
/// `WHERE` clause at all.
pub fn render_library_query(filter: &LibraryFilter, page: PageRequest) -> LibraryQuery {
    let predicates = filter.predicates();

    let (where_clause, mut params) = if predicates.is_empty() {
        (String::new(), Vec::new())
    } else {
        render_where(&predicates)
    };

    let count = RenderedQuery {
        sql: format!("SELECT COUNT(*) AS total {LIBRARY_JOIN}{where_clause}"),
        params: params.clone(),
    };

    let limit_index = params.len() + 1;
    let page_sql = format!(
        "{LIBRARY_COLUMNS} {LIBRARY_JOIN}{where_clause}{LIBRARY_ORDER} LIMIT ?{} OFFSET ?{}",
        limit_index,
        limit_index + 1
    );
    params.push(QueryValue::Integer(i64::from(page.limit())));
    params.push(QueryValue::Integer(page.offset() as i64));

    LibraryQuery {
        count,
        page: RenderedQuery {
            sql: page_sql,
            params,
        },
    }
}

/// Table a partial update writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    /// `songs`, keyed by `id`
    Song,
    /// `song_info`, keyed by `song_id`
    SongDetail,
}

impl UpdateTarget {
    fn table(self) -> &'static str {
        match self {
            UpdateTarget::Song => "songs",
            UpdateTarget::SongDetail => "song_info",
        }
    }

    fn key_column(self) -> &'static str {
        match self {
            UpdateTarget::Song => "id",
            UpdateTarget::SongDetail => "song_id",
        }
    }
}

/// Renders `UPDATE t SET a = ?1, b = ?2 WHERE key = ?3`.
///
/// Returns `None` when there is nothing to assign; callers skip the
/// statement entirely.
pub fn render_update(
    target: UpdateTarget,
    assignments: &[Assignment],
    song_id: SongId,
) -> Option<RenderedQuery> {
    if assignments.is_empty() {
        return None;
    }

    let mut sql = format!("UPDATE {} SET ", target.table());
    let mut params = Vec::with_capacity(assignments.len() + 1);

    for (index, assignment) in assignments.iter().enumerate() {
        if index > 0 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "{} = ?{}", assignment.column.bare(), index + 1);
        params.push(assignment.value.clone());
    }

    let _ = write!(
        sql,
        " WHERE {} = ?{}",
        target.key_column(),
        assignments.len() + 1
    );
    params.push(QueryValue::Integer(song_id.0));

    Some(RenderedQuery { sql, params })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> QueryValue {
        QueryValue::Text(value.to_string())
    }

    #[test]
    fn test_empty_filter_uses_unfiltered_statements() {
        let query = render_library_query(&LibraryFilter::new(), PageRequest::new(2, 20));

        assert!(!query.count.sql.contains("WHERE"));
        assert!(query.count.params.is_empty());
        assert!(!query.page.sql.contains("WHERE"));
        assert!(query
            .page
            .sql
            .ends_with("ORDER BY name, song_name, release_date LIMIT ?1 OFFSET ?2"));
        assert_eq!(
            query.page.params,
            vec![QueryValue::Integer(20), QueryValue::Integer(40)]
        );
    }

    #[test]
    fn test_blank_strings_are_not_filters() {
        let filter = LibraryFilter::new().group("").title("");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_single_title_filter_numbers_from_one() {
        let filter = LibraryFilter::new().title("Rhap");
        let query = render_library_query(&filter, PageRequest::new(0, 10));

        assert!(query.count.sql.ends_with(" WHERE songs.song_name LIKE ?1"));
        assert_eq!(query.count.params, vec![text("%Rhap%")]);
        assert!(query.page.sql.contains(" WHERE songs.song_name LIKE ?1 ORDER BY"));
        assert!(query.page.sql.ends_with("LIMIT ?2 OFFSET ?3"));
        assert_eq!(
            query.page.params,
            vec![text("%Rhap%"), QueryValue::Integer(10), QueryValue::Integer(0)]
        );
    }

    #[test]
    fn test_full_filter_keeps_group_title_date_order() {
        let date = ReleaseDate::from_ymd(1975, 10, 31).unwrap();
        let filter = LibraryFilter::new()
            .release_date(date)
            .title("Bohemian")
            .group("Queen");
        let query = render_library_query(&filter, PageRequest::new(1, 5));

        assert!(query.count.sql.ends_with(
            " WHERE groups.name LIKE ?1 AND songs.song_name LIKE ?2 AND song_info.release_date = ?3"
        ));
        assert!(query.page.sql.ends_with("LIMIT ?4 OFFSET ?5"));
        assert_eq!(
            query.page.params,
            vec![
                text("%Queen%"),
                text("%Bohemian%"),
                text("1975-10-31"),
                QueryValue::Integer(5),
                QueryValue::Integer(5),
            ]
        );
    }

    #[test]
    fn test_date_only_filter() {
        let date = ReleaseDate::from_ymd(1975, 10, 31).unwrap();
        let predicates = LibraryFilter::new().release_date(date).predicates();

        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].column, Column::ReleaseDate);
        assert_eq!(predicates[0].operator, Operator::Eq);
    }

    #[test]
    fn test_large_page_offset_does_not_overflow() {
        let query = render_library_query(&LibraryFilter::new(), PageRequest::new(u32::MAX, 1000));
        assert_eq!(
            query.page.params[1],
            QueryValue::Integer(u32::MAX as i64 * 1000)
        );
    }

    #[test]
    fn test_render_update_song_table() {
        let rendered = render_update(
            UpdateTarget::Song,
            &[
                Assignment::new(Column::GroupId, 7_i64),
                Assignment::new(Column::SongTitle, "Rhap"),
            ],
            SongId(3),
        )
        .unwrap();

        assert_eq!(
            rendered.sql,
            "UPDATE songs SET group_id = ?1, song_name = ?2 WHERE id = ?3"
        );
        assert_eq!(
            rendered.params,
            vec![QueryValue::Integer(7), text("Rhap"), QueryValue::Integer(3)]
        );
    }

    #[test]
    fn test_render_update_detail_table_subset() {
        let rendered = render_update(
            UpdateTarget::SongDetail,
            &[Assignment::new(Column::Url, "http://y")],
            SongId(9),
        )
        .unwrap();

        assert_eq!(rendered.sql, "UPDATE song_info SET url = ?1 WHERE song_id = ?2");
        assert_eq!(rendered.params, vec![text("http://y"), QueryValue::Integer(9)]);
    }

    #[test]
    fn test_render_update_without_assignments_is_none() {
        assert!(render_update(UpdateTarget::SongDetail, &[], SongId(1)).is_none());
    }
}
