//! Pagination helper types for library reads

use crate::error::{LibraryError, Result};
use crate::models::LibraryEntry;
use serde::{Deserialize, Serialize};

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (0-indexed)
    #[serde(rename = "page_idx")]
    pub page: u32,
    /// Number of entries per page
    pub page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20);
    /// assert_eq!(request.offset(), 40);
    /// assert_eq!(request.limit(), 20);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rejects a zero page size.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(LibraryError::invalid_argument(
                "page_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Calculate the SQL OFFSET value
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Get the LIMIT value (same as page_size)
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// Number of pages needed for `total` rows.
pub fn page_count(total: u64, page_size: u32) -> Result<u32> {
    if page_size == 0 {
        return Err(LibraryError::invalid_argument(
            "page_size",
            "must be greater than zero",
        ));
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).map_err(|_| {
        LibraryError::invalid_argument("page_size", format!("{} pages do not fit in u32", pages))
    })
}

/// Checks `request` against a live row count and returns the page count.
///
/// Valid page indexes are `0..page_count`. Page 0 is always valid, so an
/// empty result set yields an empty first page with a page count of 0.
///
/// # Examples
///
/// ```
/// use core_library::repositories::{validate_page, PageRequest};
///
/// assert_eq!(validate_page(45, PageRequest::new(2, 20)).unwrap(), 3);
/// assert!(validate_page(45, PageRequest::new(3, 20)).is_err());
/// assert_eq!(validate_page(0, PageRequest::new(0, 20)).unwrap(), 0);
/// ```
pub fn validate_page(total: u64, request: PageRequest) -> Result<u32> {
    request.validate()?;
    let count = page_count(total, request.page_size)?;

    if request.page != 0 && request.page >= count {
        return Err(LibraryError::PageOutOfBounds {
            page_index: request.page,
            page_count: count,
        });
    }

    Ok(count)
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Index of this page (0-indexed)
    #[serde(rename = "page_idx")]
    pub page_index: u32,
    /// Total number of pages for the filter
    pub page_count: u32,
    /// Entries of this page, in query order
    pub entries: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(entries: Vec<T>, page_index: u32, page_count: u32) -> Self {
        Self {
            page_index,
            page_count,
            entries,
        }
    }
}

/// A page of library entries
pub type LibraryPage = Page<LibraryEntry>;
