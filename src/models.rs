// Records exchanged with the cinema backend
//
// The client only relies on the identifier of each record; every other
// attribute is kept as an opaque JSON map and written back untouched.

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Backend ids are numeric for most tables but strings for some
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl RecordId {
    // Text ids are percent-encoded so they can only ever name one segment
    pub fn path_segment(&self) -> String {
        match self {
            RecordId::Number(id) => id.to_string(),
            RecordId::Text(id) => urlencoding::encode(id).into_owned(),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

macro_rules! opaque_record {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                pub id: RecordId,
                #[serde(flatten)]
                pub attributes: Map<String, Value>,
            }

            impl $name {
                pub fn attribute(&self, name: &str) -> Option<&Value> {
                    self.attributes.get(name)
                }
            }
        )+
    };
}

opaque_record!(
    Cinema,
    // Rooms are called screens on the dashboard
    Room,
    Seat,
    Combo,
    Discount,
    Genre,
    Movie,
    // A payment doubles as the invoice shown in the invoices table
    Payment,
    User,
);

// Statistic rows carry no id of their own
pub type StatisticRow = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    #[serde(alias = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("start_date".to_string(), format_date(self.start_date)),
            ("end_date".to_string(), format_date(self.end_date)),
        ]
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticKind {
    Combo,
    MovieRevenue,
    CinemaRevenue,
}

impl StatisticKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            StatisticKind::Combo => "combo",
            StatisticKind::MovieRevenue => "movie-revenue",
            StatisticKind::CinemaRevenue => "cinema-revenue",
        }
    }
}

// The two fixed movie categories shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieStatus {
    NowShowing,
    ComingSoon,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::NowShowing => "now-showing",
            MovieStatus::ComingSoon => "coming-soon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

// Multipart payload for combo create/update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComboForm {
    pub name: String,
    pub price: String,
    pub description: Option<String>,
    pub extra_fields: Vec<(String, String)>,
    pub image: Option<ImageUpload>,
}
