//! Change-request ledger
//!
//! Pending requests are reviewed by the playlist owner. Approval replays
//! the stored proposal through the same apply path as a direct edit and
//! marks the request in the same transaction, so a request is approved
//! exactly when its change landed.

use super::PlaylistService;
use crate::services::fetch_playlist;
use chorus_core::{
    ActivityEvent, ActivityType, ChangeRequest, ChangeRequestId, ChangeStatus, ChorusError,
    Playlist, PlaylistId, Result, UserId,
};
use chorus_storage::change_requests;
use chrono::Utc;
use serde_json::json;

impl PlaylistService {
    /// Owner-only; newest first
    pub async fn list_change_requests(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        status: Option<ChangeStatus>,
    ) -> Result<Vec<ChangeRequest>> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can view change requests"));
        }

        change_requests::list(&self.pool, id, status).await
    }

    pub async fn approve_change_request(
        &self,
        id: &PlaylistId,
        request_id: &ChangeRequestId,
        actor: &UserId,
    ) -> Result<Playlist> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can approve changes"));
        }
        if !playlist.approval_required {
            return Err(ChorusError::bad_request("Approval workflow is not enabled"));
        }

        let request = change_requests::get_pending(&self.pool, id, request_id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Change request", request_id))?;

        let mut tx = self.pool.begin().await?;
        let applied = self
            .apply(&mut tx, id, &request.proposal, &request.requested_by)
            .await?;
        let marked = change_requests::mark_reviewed(
            &mut *tx,
            request_id,
            ChangeStatus::Approved,
            actor,
            Utc::now(),
        )
        .await?;
        if !marked {
            // Reviewed concurrently; dropping the transaction rolls back the apply
            return Err(ChorusError::not_found("Change request", request_id));
        }
        tx.commit().await?;

        tracing::info!("Change request {} approved on playlist {}", request_id, id);

        if let Some(event) = applied {
            self.activity.record(event).await;
        }
        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistChangeApproved,
                id,
                json!({
                    "change_request_id": request_id,
                    "action": request.proposal.action(),
                }),
            ))
            .await;

        self.view(id).await
    }

    pub async fn reject_change_request(
        &self,
        id: &PlaylistId,
        request_id: &ChangeRequestId,
        actor: &UserId,
    ) -> Result<ChangeRequest> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can reject changes"));
        }
        if !playlist.approval_required {
            return Err(ChorusError::bad_request("Approval workflow is not enabled"));
        }

        let mut request = change_requests::get_pending(&self.pool, id, request_id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Change request", request_id))?;

        let reviewed_at = Utc::now();
        let marked = change_requests::mark_reviewed(
            &self.pool,
            request_id,
            ChangeStatus::Rejected,
            actor,
            reviewed_at,
        )
        .await?;
        if !marked {
            return Err(ChorusError::not_found("Change request", request_id));
        }

        request.status = ChangeStatus::Rejected;
        request.reviewed_by = Some(actor.clone());
        request.reviewed_at = Some(reviewed_at);

        tracing::info!("Change request {} rejected on playlist {}", request_id, id);

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistChangeRejected,
                id,
                json!({
                    "change_request_id": request_id,
                    "action": request.proposal.action(),
                }),
            ))
            .await;

        Ok(request)
    }
}
