//! Playlist collaborator types
//!
//! A collaborator row moves through a small state machine:
//!
//! - `invite`: new row, `Pending`
//! - `reinvite`: `Pending -> Pending` self-loop on a reused row, resetting
//!   `invited_at` and clearing `accepted_at`
//! - `accept`: `Pending -> Accepted` (idempotent once accepted)
//! - reject/remove delete the row
//!
//! The owner row is created `Accepted` together with the playlist and is
//! never removed or reassigned.

use super::ids::{CollaboratorId, PlaylistId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds on a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl Role {
    /// Convert role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may mutate membership at all
    pub fn can_edit(&self) -> bool {
        !matches!(self, Role::Viewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown collaborator role: {other}")),
        }
    }
}

/// Invite status of a collaborator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorStatus {
    Pending,
    Accepted,
}

impl CollaboratorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorStatus::Pending => "pending",
            CollaboratorStatus::Accepted => "accepted",
        }
    }
}

impl FromStr for CollaboratorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CollaboratorStatus::Pending),
            "accepted" => Ok(CollaboratorStatus::Accepted),
            other => Err(format!("unknown collaborator status: {other}")),
        }
    }
}

/// A (playlist, user) role grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub role: Role,
    pub status: CollaboratorStatus,
    pub invited_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Collaborator {
    /// Accepted owner row, created alongside its playlist
    pub fn owner(playlist_id: PlaylistId, user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CollaboratorId::generate(),
            playlist_id,
            user_id,
            role: Role::Owner,
            status: CollaboratorStatus::Accepted,
            invited_at: now,
            accepted_at: Some(now),
        }
    }

    /// Fresh pending invite
    pub fn invite(playlist_id: PlaylistId, user_id: UserId, role: Role) -> Self {
        Self {
            id: CollaboratorId::generate(),
            playlist_id,
            user_id,
            role,
            status: CollaboratorStatus::Pending,
            invited_at: Utc::now(),
            accepted_at: None,
        }
    }

    /// Re-invite on a reused row
    pub fn reinvite(&mut self, role: Role) {
        self.role = role;
        self.status = CollaboratorStatus::Pending;
        self.invited_at = Utc::now();
        self.accepted_at = None;
    }

    /// Accept the invite; returns `false` when it was already accepted
    pub fn accept(&mut self) -> bool {
        if self.status == CollaboratorStatus::Accepted {
            return false;
        }
        self.status = CollaboratorStatus::Accepted;
        self.accepted_at = Some(Utc::now());
        true
    }

    pub fn is_accepted(&self) -> bool {
        self.status == CollaboratorStatus::Accepted
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}
