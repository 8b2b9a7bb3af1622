//! Change requests for approval-gated playlists

use super::ids::{ChangeRequestId, PlaylistId, TrackId, UserId};
use super::playlist::TrackPosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A proposed membership mutation, tagged by action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum ChangeProposal {
    AddTrack {
        track_id: TrackId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
    },
    RemoveTrack {
        track_id: TrackId,
    },
    ReorderTracks {
        tracks: Vec<TrackPosition>,
    },
}

impl ChangeProposal {
    /// Action name as stored in the `action` column
    pub fn action(&self) -> &'static str {
        match self {
            ChangeProposal::AddTrack { .. } => "add_track",
            ChangeProposal::RemoveTrack { .. } => "remove_track",
            ChangeProposal::ReorderTracks { .. } => "reorder_tracks",
        }
    }

    /// Action-specific payload as stored in the `payload` column
    pub fn payload(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(mut tagged) => tagged
                .get_mut("payload")
                .map(serde_json::Value::take)
                .unwrap_or_default(),
            Err(_) => serde_json::Value::Null,
        }
    }

    /// Rebuild a proposal from its stored columns
    pub fn from_parts(action: &str, payload: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::json!({ "action": action, "payload": payload }))
    }
}

/// Review status of a change request; approved and rejected are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChangeStatus::Pending)
    }
}

impl FromStr for ChangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ChangeStatus::Pending),
            "approved" => Ok(ChangeStatus::Approved),
            "rejected" => Ok(ChangeStatus::Rejected),
            other => Err(format!("unknown change request status: {other}")),
        }
    }
}

/// A mutation proposed by a non-owner on an approval-gated playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub playlist_id: PlaylistId,
    pub requested_by: UserId,
    #[serde(flatten)]
    pub proposal: ChangeProposal,
    pub status: ChangeStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ChangeRequest {
    /// New pending request
    pub fn new(playlist_id: PlaylistId, requested_by: UserId, proposal: ChangeProposal) -> Self {
        Self {
            id: ChangeRequestId::generate(),
            playlist_id,
            requested_by,
            proposal,
            status: ChangeStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_round_trips_through_columns() {
        let proposal = ChangeProposal::ReorderTracks {
            tracks: vec![TrackPosition {
                track_id: TrackId::new("t-1"),
                position: 2,
            }],
        };
        let payload = proposal.payload();
        assert_eq!(payload["tracks"][0]["position"], 2);

        let rebuilt = ChangeProposal::from_parts(proposal.action(), payload).unwrap();
        assert_eq!(rebuilt, proposal);
    }

    #[test]
    fn add_track_payload_omits_missing_position() {
        let proposal = ChangeProposal::AddTrack {
            track_id: TrackId::new("t-9"),
            position: None,
        };
        assert_eq!(proposal.action(), "add_track");
        assert_eq!(proposal.payload(), serde_json::json!({ "track_id": "t-9" }));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(ChangeProposal::from_parts("rename", serde_json::json!({})).is_err());
    }

    #[test]
    fn request_serializes_action_and_payload_inline() {
        let request = ChangeRequest::new(
            PlaylistId::new("p"),
            UserId::new("u"),
            ChangeProposal::RemoveTrack {
                track_id: TrackId::new("t"),
            },
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "remove_track");
        assert_eq!(json["payload"]["track_id"], "t");
        assert_eq!(json["status"], "pending");
        assert!(!request.status.is_terminal());
    }
}
