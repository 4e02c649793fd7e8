//! Team member invitations.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use tracing::instrument;

use converty_core::{InviteStatus, TeamMemberId, TeamRole};

use crate::db::{RepositoryError, TeamRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{InviteForm, TeamMember};
use crate::state::AppState;

use super::products::SelectOption;
use super::{FlashQuery, ShellView, redirect_error, redirect_success, render};

const TEAM_PATH: &str = "/dashboard/team";

#[derive(Debug, Clone)]
pub struct TeamMemberView {
    pub id: String,
    pub email: String,
    pub role: &'static str,
    pub pending: bool,
    pub invited_at: String,
}

impl From<&TeamMember> for TeamMemberView {
    fn from(m: &TeamMember) -> Self {
        Self {
            id: m.id.to_string(),
            email: m.user_email.to_string(),
            role: m.role.label(),
            pending: m.status == InviteStatus::Pending,
            invited_at: m.created_at.format("%b %d, %Y").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "team/index.html")]
pub struct TeamTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub owner_email: String,
    pub members: Vec<TeamMemberView>,
    pub roles: Vec<SelectOption>,
}

/// GET /dashboard/team
#[instrument(skip_all)]
pub async fn index(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let members = TeamRepository::new(state.pool())
        .list(session.shop.id)
        .await?;

    Ok(render(&TeamTemplate {
        shell: ShellView::new(&state, &session, TEAM_PATH),
        flash,
        owner_email: session.merchant.email.to_string(),
        members: members.iter().map(TeamMemberView::from).collect(),
        roles: TeamRole::ALL
            .iter()
            .map(|r| SelectOption {
                value: r.as_str().to_string(),
                label: r.label().to_string(),
                selected: *r == TeamRole::default(),
            })
            .collect(),
    }))
}

/// POST /dashboard/team/invite
#[instrument(skip_all)]
pub async fn invite(
    session: ShopSession,
    State(state): State<AppState>,
    Form(form): Form<InviteForm>,
) -> Result<Response> {
    let (email, role) = match form.validate() {
        Ok(invite) => invite,
        Err(e) => return Ok(redirect_error(TEAM_PATH, &e.0)),
    };

    if email == session.merchant.email {
        return Ok(redirect_error(TEAM_PATH, "You are already the owner of this shop"));
    }

    match TeamRepository::new(state.pool())
        .invite(session.shop.id, &email, role, session.merchant.id)
        .await
    {
        Ok(member) => {
            tracing::info!(member_id = %member.id, role = %role, "Team member invited");
            Ok(redirect_success(
                TEAM_PATH,
                &format!("Invitation recorded for {email}"),
            ))
        }
        Err(RepositoryError::Conflict(message)) => Ok(redirect_error(TEAM_PATH, &message)),
        Err(e) => Err(e.into()),
    }
}

/// POST /dashboard/team/{id}/remove
#[instrument(skip(session, state))]
pub async fn remove(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<TeamMemberId>,
) -> Result<Response> {
    match TeamRepository::new(state.pool())
        .remove(session.shop.id, id)
        .await
    {
        Ok(()) => {
            tracing::info!(member_id = %id, "Team member removed");
            Ok(redirect_success(TEAM_PATH, "Team member removed"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_error(TEAM_PATH, "Team member not found")),
        Err(e) => Err(e.into()),
    }
}
