//! Page/limit/sort normalization and page-count metadata.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackerError},
    fields::{EntityType, FieldRegistry},
    query::Record,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_SORT_BY: &str = "createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(TrackerError::Validation(format!(
                "Invalid sortOrder: '{other}'. Must be one of: asc, desc"
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Single-key sort specification over a registry field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    /// In-memory ordering of two records under this spec
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let ordering = a.field_value(self.field).compare(&b.field_value(self.field));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Raw pagination parameters as the caller sent them
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPagination<'a> {
    pub page: Option<&'a str>,
    pub limit: Option<&'a str>,
    pub sort_by: Option<&'a str>,
    pub sort_order: Option<&'a str>,
}

/// Validated pagination and sort for one list call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub sort: SortSpec,
}

impl Default for Pagination {
    /// First page, ten per page, newest first
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortSpec {
                field: DEFAULT_SORT_BY,
                order: SortOrder::Desc,
            },
        }
    }
}

impl Pagination {
    /// Number of records to skip
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Page metadata for a total result count
    pub fn meta(&self, total_data: u64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total_data,
            total_pages: total_pages(total_data, self.limit),
        }
    }
}

/// Page count; an empty result still reports one page
pub fn total_pages(total_data: u64, limit: u32) -> u64 {
    if total_data == 0 {
        1
    } else {
        total_data.div_ceil(u64::from(limit.max(1)))
    }
}

/// List metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total_data: u64,
    pub total_pages: u64,
}

/// Validates and normalizes caller pagination
pub struct PaginationSorter;

impl PaginationSorter {
    /// Normalize raw parameters, applying defaults for absent ones.
    ///
    /// # Returns
    /// * `Ok(Pagination)` - Page ≥ 1, limit in 1..=100, sort field sortable for `entity`
    /// * `Err(TrackerError::Validation)` - If any parameter is malformed or out of range
    pub fn normalize(entity: EntityType, raw: RawPagination<'_>) -> Result<Pagination> {
        let page = match raw.page {
            Some(value) => parse_integer("page", value, 1, u32::MAX)?,
            None => DEFAULT_PAGE,
        };
        let limit = match raw.limit {
            Some(value) => parse_integer("limit", value, 1, MAX_LIMIT)?,
            None => DEFAULT_LIMIT,
        };
        let field = match raw.sort_by {
            Some(value) => FieldRegistry::sortable(entity)
                .iter()
                .copied()
                .find(|field| *field == value)
                .ok_or_else(|| {
                    TrackerError::invalid_keys(
                        &format!("Invalid sortBy for {entity}"),
                        &[value.to_string()],
                    )
                })?,
            None => DEFAULT_SORT_BY,
        };
        let order = match raw.sort_order {
            Some(value) => SortOrder::parse(value)?,
            None => SortOrder::default(),
        };

        Ok(Pagination {
            page,
            limit,
            sort: SortSpec { field, order },
        })
    }
}

fn parse_integer(name: &str, value: &str, min: u32, max: u32) -> Result<u32> {
    let not_an_integer =
        || TrackerError::Validation(format!("Invalid {name}: '{value}' is not a positive integer"));
    // Plain digits only: no sign, no surrounding whitespace
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_an_integer());
    }
    let parsed: u32 = value.parse().map_err(|_| not_an_integer())?;
    if parsed < min || parsed > max {
        return Err(TrackerError::Validation(format!(
            "Invalid {name}: {parsed} must be between {min} and {max}"
        )));
    }
    Ok(parsed)
}
