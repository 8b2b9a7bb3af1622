//! Smart playlist criteria
//!
//! Clients send criteria as a loosely shaped JSON object keyed by `type`.
//! [`Criteria::normalize`] is the single gate that turns that object into a
//! closed [`CriteriaKind`] with a clamped limit. Preview, creation and
//! refresh all go through it, so a preview followed by a create resolves
//! the same track set.

use super::ids::{ArtistId, PlaylistId, SmartPlaylistId};
use super::track::{TrackFilter, TrackOrder, TrackQuery};
use crate::error::{ChorusError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Limit applied when the client sends none
pub const DEFAULT_LIMIT: u32 = 50;

/// Upper bound for any resolution
pub const MAX_LIMIT: u32 = 200;

/// Which tracks populate a smart playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriteriaKind {
    Genre {
        genres: Vec<String>,
    },
    Artist {
        artist_ids: Vec<ArtistId>,
    },
    DateRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<DateTime<Utc>>,
    },
    MostTipped,
    RecentlyPlayed,
    FollowedArtistsLatest,
}

/// Normalized criteria: a validated kind plus a limit in `1..=200`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(flatten)]
    pub kind: CriteriaKind,
    pub limit: u32,
}

impl Criteria {
    /// Validate and normalize raw client criteria.
    pub fn normalize(raw: &Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| ChorusError::bad_request("Criteria must be a valid object"))?;

        let kind_name = obj
            .get("type")
            .and_then(scalar_to_string)
            .unwrap_or_default();
        let kind_name = kind_name.trim();
        if kind_name.is_empty() {
            return Err(ChorusError::bad_request("Criteria type is required"));
        }

        let limit = normalize_limit(obj.get("limit"))?;

        let kind = match kind_name {
            "genre" => {
                let genres = string_list(first_present(obj, &["genres", "genre"]));
                if genres.is_empty() {
                    return Err(ChorusError::bad_request("At least one genre is required"));
                }
                CriteriaKind::Genre { genres }
            }
            "artist" => {
                let artist_ids = string_list(first_present(
                    obj,
                    &["artistIds", "artist_ids", "artistId", "artist_id"],
                ));
                if artist_ids.is_empty() {
                    return Err(ChorusError::bad_request("At least one artist is required"));
                }
                CriteriaKind::Artist {
                    artist_ids: artist_ids.into_iter().map(ArtistId::new).collect(),
                }
            }
            "date_range" => {
                let from = parse_bound(obj.get("from"));
                let to = parse_bound(obj.get("to"));
                match (from, to) {
                    (Bound::Absent, Bound::Absent) => {
                        return Err(ChorusError::bad_request(
                            "Date range requires a from or to value",
                        ));
                    }
                    (Bound::Invalid, _) | (_, Bound::Invalid) => {
                        return Err(ChorusError::bad_request("Invalid date range"));
                    }
                    (from, to) => CriteriaKind::DateRange {
                        from: from.value(),
                        to: to.value(),
                    },
                }
            }
            "most_tipped" => CriteriaKind::MostTipped,
            "recently_played" => CriteriaKind::RecentlyPlayed,
            "followed_artists_latest" => CriteriaKind::FollowedArtistsLatest,
            other => {
                return Err(ChorusError::bad_request(format!(
                    "Unsupported criteria type: {other}"
                )));
            }
        };

        Ok(Self { kind, limit })
    }

    /// Re-normalize criteria loaded from storage
    pub fn from_stored(raw: &Value) -> Result<Self> {
        Self::normalize(raw)
    }

    /// Serialized form stored in the `criteria` column
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build the catalog query for this criteria.
    ///
    /// `followed` is only consulted for `FollowedArtistsLatest`; callers
    /// short-circuit before querying when that set is empty.
    pub fn to_query(&self, followed: &[ArtistId]) -> TrackQuery {
        let (filter, order) = match &self.kind {
            CriteriaKind::Genre { genres } => (TrackFilter::Genres(genres.clone()), TrackOrder::CreatedAt),
            CriteriaKind::Artist { artist_ids } => {
                (TrackFilter::Artists(artist_ids.clone()), TrackOrder::CreatedAt)
            }
            CriteriaKind::DateRange { from, to } => (
                TrackFilter::ReleasedBetween {
                    from: *from,
                    to: *to,
                },
                TrackOrder::CreatedAt,
            ),
            CriteriaKind::MostTipped => (TrackFilter::All, TrackOrder::TotalTips),
            CriteriaKind::RecentlyPlayed => (TrackFilter::All, TrackOrder::UpdatedAt),
            CriteriaKind::FollowedArtistsLatest => {
                (TrackFilter::Artists(followed.to_vec()), TrackOrder::CreatedAt)
            }
        };
        TrackQuery {
            filter,
            order,
            limit: self.limit,
        }
    }
}

/// Smart playlist linkage stored alongside a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartPlaylist {
    pub id: SmartPlaylistId,
    pub playlist_id: PlaylistId,
    pub criteria: Criteria,
    pub auto_update: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Request body for smart playlist creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSmartPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub criteria: Value,
    #[serde(default)]
    pub auto_update: Option<bool>,
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let entries: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    };
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn normalize_limit(value: Option<&Value>) -> Result<u32> {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => Ok(DEFAULT_LIMIT),
        Some(Value::String(s)) if s.is_empty() => Ok(DEFAULT_LIMIT),
        Some(Value::Number(n)) => {
            let limit = n
                .as_f64()
                .ok_or_else(|| ChorusError::bad_request("Limit must be a number"))?;
            if limit.abs() < f64::EPSILON {
                return Ok(DEFAULT_LIMIT);
            }
            if limit < 1.0 {
                return Err(ChorusError::bad_request("Limit must be at least 1"));
            }
            Ok(limit.min(f64::from(MAX_LIMIT)).floor() as u32)
        }
        Some(_) => Err(ChorusError::bad_request("Limit must be a number")),
    }
}

enum Bound {
    Absent,
    Valid(DateTime<Utc>),
    Invalid,
}

impl Bound {
    fn value(self) -> Option<DateTime<Utc>> {
        match self {
            Bound::Valid(at) => Some(at),
            Bound::Absent | Bound::Invalid => None,
        }
    }
}

fn parse_bound(value: Option<&Value>) -> Bound {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => Bound::Absent,
        Some(Value::String(s)) if s.is_empty() => Bound::Absent,
        Some(Value::String(s)) => parse_date(s.trim()).map_or(Bound::Invalid, Bound::Valid),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Bound::Absent,
            Some(millis) => DateTime::from_timestamp_millis(millis).map_or(Bound::Invalid, Bound::Valid),
            None => Bound::Invalid,
        },
        Some(_) => Bound::Invalid,
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn bad_request_message(raw: Value) -> String {
        match Criteria::normalize(&raw) {
            Err(ChorusError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn genre_accepts_single_string_and_trims() {
        let criteria = Criteria::normalize(&json!({ "type": "genre", "genre": "  lofi " })).unwrap();
        assert_eq!(
            criteria.kind,
            CriteriaKind::Genre {
                genres: vec!["lofi".to_string()]
            }
        );
        assert_eq!(criteria.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn genre_requires_non_empty_values() {
        assert_eq!(
            bad_request_message(json!({ "type": "genre", "genres": ["", "  "] })),
            "At least one genre is required"
        );
    }

    #[test]
    fn artist_accepts_camel_case_ids() {
        let criteria =
            Criteria::normalize(&json!({ "type": "artist", "artistIds": ["a-1", "a-2"], "limit": 10 }))
                .unwrap();
        assert_eq!(
            criteria.kind,
            CriteriaKind::Artist {
                artist_ids: vec![ArtistId::new("a-1"), ArtistId::new("a-2")]
            }
        );
        assert_eq!(criteria.limit, 10);
    }

    #[test]
    fn artist_requires_ids() {
        assert_eq!(
            bad_request_message(json!({ "type": "artist" })),
            "At least one artist is required"
        );
    }

    #[test]
    fn date_range_requires_a_bound() {
        assert_eq!(
            bad_request_message(json!({ "type": "date_range" })),
            "Date range requires a from or to value"
        );
    }

    #[test]
    fn date_range_rejects_unparseable_bound() {
        assert_eq!(
            bad_request_message(json!({ "type": "date_range", "from": "2024-01-01", "to": "soon" })),
            "Invalid date range"
        );
    }

    #[test]
    fn date_range_parses_plain_dates_as_utc_midnight() {
        let criteria =
            Criteria::normalize(&json!({ "type": "date_range", "from": "2024-03-01" })).unwrap();
        match criteria.kind {
            CriteriaKind::DateRange { from, to } => {
                assert_eq!(from.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
                assert!(to.is_none());
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn missing_and_unknown_types_are_rejected() {
        assert_eq!(bad_request_message(json!({ "limit": 5 })), "Criteria type is required");
        assert_eq!(
            bad_request_message(json!({ "type": "mood" })),
            "Unsupported criteria type: mood"
        );
        assert_eq!(bad_request_message(json!(["genre"])), "Criteria must be a valid object");
    }

    #[test]
    fn limit_rules() {
        let zero = Criteria::normalize(&json!({ "type": "most_tipped", "limit": 0 })).unwrap();
        assert_eq!(zero.limit, DEFAULT_LIMIT);

        let huge = Criteria::normalize(&json!({ "type": "most_tipped", "limit": 5000 })).unwrap();
        assert_eq!(huge.limit, MAX_LIMIT);

        assert_eq!(
            bad_request_message(json!({ "type": "most_tipped", "limit": -3 })),
            "Limit must be at least 1"
        );
        assert_eq!(
            bad_request_message(json!({ "type": "most_tipped", "limit": "10" })),
            "Limit must be a number"
        );
    }

    #[test]
    fn stored_form_normalizes_to_itself() {
        let criteria = Criteria::normalize(&json!({
            "type": "date_range",
            "from": "2024-01-01T00:00:00Z",
            "to": "2024-12-31",
            "limit": 25
        }))
        .unwrap();
        let again = Criteria::from_stored(&criteria.to_value().unwrap()).unwrap();
        assert_eq!(again, criteria);
    }

    #[test]
    fn ordering_follows_kind() {
        let tipped = Criteria::normalize(&json!({ "type": "most_tipped" })).unwrap();
        assert_eq!(tipped.to_query(&[]).order, TrackOrder::TotalTips);

        let played = Criteria::normalize(&json!({ "type": "recently_played" })).unwrap();
        assert_eq!(played.to_query(&[]).order, TrackOrder::UpdatedAt);

        let followed = Criteria::normalize(&json!({ "type": "followed_artists_latest" })).unwrap();
        let query = followed.to_query(&[ArtistId::new("a")]);
        assert_eq!(query.order, TrackOrder::CreatedAt);
        assert_eq!(query.filter, TrackFilter::Artists(vec![ArtistId::new("a")]));
    }

    proptest! {
        /// Property: any accepted numeric limit lands in 1..=200
        #[test]
        fn accepted_limits_are_clamped(limit in 1u64..100_000) {
            let criteria = Criteria::normalize(&json!({ "type": "most_tipped", "limit": limit })).unwrap();
            prop_assert!(criteria.limit >= 1);
            prop_assert!(criteria.limit <= MAX_LIMIT);
        }
    }
}
