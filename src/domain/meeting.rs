use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    LocationName, MeetingId, MeetingLink, MeetingTopic, MeetingType, ParticipantEmail,
    ParticipantId,
};

/// Timestamp layout used by the REST API.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meeting {
    pub id: MeetingId,
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(with = "api_datetime")]
    pub start_time: NaiveDateTime,
    /// Planned length in minutes.
    #[serde(rename = "duration", default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Payload sent when creating or updating a meeting.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewMeeting {
    pub topic: MeetingTopic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<MeetingLink>,
    #[serde(with = "api_datetime")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub participants: Vec<ParticipantEmail>,
}

impl NewMeeting {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        topic: MeetingTopic,
        description: Option<String>,
        meeting_type: MeetingType,
        location: Option<LocationName>,
        meeting_link: Option<MeetingLink>,
        start_time: NaiveDateTime,
        duration_minutes: u32,
        participants: Vec<ParticipantEmail>,
    ) -> Self {
        Self {
            topic,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            meeting_type,
            location,
            meeting_link,
            start_time,
            duration_minutes,
            participants,
        }
    }
}

/// Accepts both `YYYY-MM-DD HH:MM:SS` and ISO-8601 timestamps, writes the former.
mod api_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::API_DATETIME_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(API_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, API_DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_utc()))
            .map_err(|_| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
