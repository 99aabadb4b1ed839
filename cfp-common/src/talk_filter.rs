//! Filtered, sorted, paginated talk listings for review queues
//!
//! Each listed talk is annotated with the acting admin's own rating and
//! viewed flag so the UI can show "already rated" state. Read-only: this
//! module only issues SELECT statements.

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::db::models::Talk;
use crate::db::talks::{talk_from_row, TALK_COLUMNS};
use crate::pagination::{calculate_pagination, sanitize_per_page};
use crate::Result;

/// Which talks a listing includes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkFilter {
    All,
    Selected,
    Favorited,
    /// Rated by the acting admin
    Rated,
    /// Not yet rated by the acting admin
    NotRated,
    /// Viewed by the acting admin
    Viewed,
    /// Not yet viewed by the acting admin
    NotViewed,
    /// Talks in a category (case-insensitive)
    Category(String),
}

impl TalkFilter {
    /// Parse a filter keyword. Absent or blank means all talks; any
    /// unrecognized keyword is treated as a category name.
    pub fn parse(keyword: Option<&str>) -> Self {
        let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) else {
            return TalkFilter::All;
        };

        match keyword.to_lowercase().as_str() {
            "selected" => TalkFilter::Selected,
            "favorited" => TalkFilter::Favorited,
            "rated" => TalkFilter::Rated,
            "notrated" => TalkFilter::NotRated,
            "viewed" => TalkFilter::Viewed,
            "notviewed" => TalkFilter::NotViewed,
            _ => TalkFilter::Category(keyword.to_string()),
        }
    }

    fn where_clause(&self) -> &'static str {
        match self {
            TalkFilter::All => "1 = 1",
            TalkFilter::Selected => "talks.selected = 1",
            TalkFilter::Favorited => "talks.favorite = 1",
            TalkFilter::Rated => "meta.rating IS NOT NULL",
            TalkFilter::NotRated => "meta.rating IS NULL",
            TalkFilter::Viewed => "meta.viewed = 1",
            TalkFilter::NotViewed => "COALESCE(meta.viewed, 0) = 0",
            TalkFilter::Category(_) => "talks.category = ? COLLATE NOCASE",
        }
    }
}

/// Sortable columns. Anything else falls back to title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Title,
    Category,
    Type,
    Level,
    CreatedAt,
    /// The acting admin's rating
    Rating,
}

impl SortColumn {
    pub fn parse(order_by: Option<&str>) -> Self {
        match order_by.map(|o| o.trim().to_lowercase()).as_deref() {
            Some("category") => SortColumn::Category,
            Some("type") => SortColumn::Type,
            Some("level") => SortColumn::Level,
            Some("created_at") => SortColumn::CreatedAt,
            Some("rating") => SortColumn::Rating,
            _ => SortColumn::Title,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Title => "title",
            SortColumn::Category => "category",
            SortColumn::Type => "type",
            SortColumn::Level => "level",
            SortColumn::CreatedAt => "created_at",
            SortColumn::Rating => "rating",
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            SortColumn::Title => "talks.title COLLATE NOCASE",
            SortColumn::Category => "talks.category COLLATE NOCASE",
            SortColumn::Type => "talks.type COLLATE NOCASE",
            SortColumn::Level => "talks.level COLLATE NOCASE",
            SortColumn::CreatedAt => "talks.created_at",
            SortColumn::Rating => "meta.rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(sort: Option<&str>) -> Self {
        match sort.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Listing options as they arrive from the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TalkListOptions {
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Talk annotated for the acting admin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkView {
    #[serde(flatten)]
    pub talk: Talk,
    pub speaker_email: String,
    pub speaker_name: String,
    /// The acting admin's rating, if they rated this talk
    pub rating: Option<i64>,
    /// Whether the acting admin has opened this talk
    pub viewed: bool,
}

/// One page of a talk listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkPage {
    pub talks: Vec<TalkView>,
    pub total_records: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub order_by: &'static str,
    pub sort: &'static str,
}

const FROM_CLAUSE: &str = "FROM talks
     JOIN users ON users.id = talks.user_id
     LEFT JOIN talk_meta AS meta ON meta.talk_id = talks.id AND meta.admin_user_id = ?";

fn view_from_row(row: &SqliteRow) -> Result<TalkView> {
    let first_name: String = row.try_get("speaker_first_name")?;
    let last_name: String = row.try_get("speaker_last_name")?;
    let viewed: Option<bool> = row.try_get("meta_viewed")?;

    Ok(TalkView {
        talk: talk_from_row(row)?,
        speaker_email: row.try_get("speaker_email")?,
        speaker_name: format!("{} {}", first_name, last_name),
        rating: row.try_get("meta_rating")?,
        viewed: viewed.unwrap_or(false),
    })
}

/// Produce one page of talks for the acting admin.
///
/// Without `order_by`/`sort` the listing is ordered by title ascending.
/// Ties are always broken by talk id so repeated calls page identically.
pub async fn get_talks(
    pool: &SqlitePool,
    admin_id: i64,
    filter: Option<&str>,
    options: &TalkListOptions,
) -> Result<TalkPage> {
    let filter = TalkFilter::parse(filter);
    let order_by = SortColumn::parse(options.order_by.as_deref());
    let sort = SortDirection::parse(options.sort.as_deref());
    let per_page = sanitize_per_page(options.per_page);

    let category = match &filter {
        TalkFilter::Category(category) => Some(category.as_str()),
        _ => None,
    };

    let count_sql = format!(
        "SELECT COUNT(*) {} WHERE {}",
        FROM_CLAUSE,
        filter.where_clause()
    );
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(admin_id);
    if let Some(category) = category {
        count_query = count_query.bind(category);
    }
    let total_records = count_query.fetch_one(pool).await?;

    let p = calculate_pagination(total_records, options.page.unwrap_or(1), per_page);

    let list_sql = format!(
        "SELECT {}, users.email AS speaker_email, users.first_name AS speaker_first_name,
                users.last_name AS speaker_last_name, meta.rating AS meta_rating,
                meta.viewed AS meta_viewed
         {} WHERE {}
         ORDER BY {} {}, talks.id ASC
         LIMIT ? OFFSET ?",
        TALK_COLUMNS,
        FROM_CLAUSE,
        filter.where_clause(),
        order_by.sql(),
        sort.sql()
    );
    let mut list_query = sqlx::query(&list_sql).bind(admin_id);
    if let Some(category) = category {
        list_query = list_query.bind(category);
    }
    let rows = list_query
        .bind(p.per_page)
        .bind(p.offset)
        .fetch_all(pool)
        .await?;

    let talks = rows.iter().map(view_from_row).collect::<Result<Vec<_>>>()?;

    Ok(TalkPage {
        talks,
        total_records,
        page: p.page,
        per_page: p.per_page,
        total_pages: p.total_pages,
        order_by: order_by.as_str(),
        sort: sort.as_str(),
    })
}
