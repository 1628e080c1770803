//! Raw Kick API payloads.
//!
//! Kick's channel payload differs between API versions and is loosely typed:
//! fields are frequently `null`, follower counts appear under two spellings and
//! the live category is either a single object or a list. The models accept all
//! of these shapes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Response of `GET /v2/channels/{username}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub livestream: Option<Livestream>,
    #[serde(default, alias = "followersCount")]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub banner_image: Option<BannerImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_livestreams: Vec<PreviousLivestream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Livestream {
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub viewer_count: Option<u64>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BannerImage {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviousLivestream {
    #[serde(default)]
    pub start_time: Option<String>,
}

/// One entry of `GET /v2/channels/{username}/videos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// The videos endpoint answers either with a bare list or with `{"data": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum VideosPayload {
    List(Vec<Video>),
    Envelope {
        #[serde(default, deserialize_with = "null_as_default")]
        data: Vec<Video>,
    },
}

impl VideosPayload {
    pub(crate) fn into_videos(self) -> Vec<Video> {
        match self {
            VideosPayload::List(videos) => videos,
            VideosPayload::Envelope { data } => data,
        }
    }
}

impl Livestream {
    /// Name of the live category, preferring the singular `category` object.
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .or_else(|| self.categories.iter().find_map(|c| c.name.as_deref()))
            .filter(|name| !name.is_empty())
    }

    /// A session object is on air unless Kick explicitly flags it as ended.
    pub fn is_on_air(&self) -> bool {
        self.is_live != Some(false)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_timestamp)
    }
}

impl ChannelResponse {
    /// Most recent start time in the `previous_livestreams` history.
    pub fn most_recent_previous_start(&self) -> Option<DateTime<Utc>> {
        self.previous_livestreams
            .iter()
            .filter_map(|l| l.start_time.as_deref().and_then(parse_timestamp))
            .max()
    }
}

impl Video {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.start_time.as_deref().and_then(parse_timestamp))
    }

    /// Most recent start time across a list of videos.
    pub fn most_recent(videos: &[Video]) -> Option<DateTime<Utc>> {
        videos.iter().filter_map(Video::started_at).max()
    }
}

/// Parse a Kick timestamp.
///
/// Kick mixes RFC 3339 strings with naive `YYYY-MM-DD HH:MM:SS` values that are
/// UTC. Anything else yields `None`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00.000000Z"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_channel_response_accepts_nulls() {
        let json = r#"{
            "user": {"username": "sxb", "profile_pic": null, "bio": null},
            "livestream": null,
            "followersCount": 1200,
            "banner_image": null,
            "previous_livestreams": null
        }"#;
        let response: ChannelResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user.unwrap().username, "sxb");
        assert!(response.livestream.is_none());
        assert_eq!(response.followers_count, Some(1200));
        assert!(response.previous_livestreams.is_empty());
    }

    #[test]
    fn test_is_on_air() {
        let stream: Livestream = serde_json::from_str(r#"{"is_live": true}"#).unwrap();
        assert!(stream.is_on_air());
        let stream: Livestream = serde_json::from_str(r#"{"session_title": "x"}"#).unwrap();
        assert!(stream.is_on_air());
        let stream: Livestream = serde_json::from_str(r#"{"is_live": false}"#).unwrap();
        assert!(!stream.is_on_air());
    }

    #[test]
    fn test_category_name_prefers_single_category() {
        let stream: Livestream = serde_json::from_str(
            r#"{"category": {"name": "GTA V"}, "categories": [{"name": "Just Chatting"}]}"#,
        )
        .unwrap();
        assert_eq!(stream.category_name(), Some("GTA V"));

        let stream: Livestream =
            serde_json::from_str(r#"{"categories": [{"name": "Just Chatting"}]}"#).unwrap();
        assert_eq!(stream.category_name(), Some("Just Chatting"));

        let stream: Livestream = serde_json::from_str(r#"{"category": {"name": ""}}"#).unwrap();
        assert_eq!(stream.category_name(), None);
    }

    #[test]
    fn test_most_recent_previous_start() {
        let response: ChannelResponse = serde_json::from_str(
            r#"{
                "user": {"username": "a"},
                "previous_livestreams": [
                    {"start_time": "2024-01-01 10:00:00"},
                    {"start_time": "2024-03-01 10:00:00"},
                    {"start_time": null},
                    {"start_time": "2024-02-01 10:00:00"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            response.most_recent_previous_start(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_videos_payload_shapes() {
        let list: VideosPayload =
            serde_json::from_str(r#"[{"created_at": "2024-01-01T00:00:00Z"}]"#).unwrap();
        assert_eq!(list.into_videos().len(), 1);

        let envelope: VideosPayload =
            serde_json::from_str(r#"{"data": [{"start_time": "2024-01-01 00:00:00"}, {}]}"#)
                .unwrap();
        let videos = envelope.into_videos();
        assert_eq!(videos.len(), 2);
        assert_eq!(
            Video::most_recent(&videos),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }
}
