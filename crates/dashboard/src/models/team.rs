//! Team member invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use converty_core::{Email, InviteStatus, ShopId, TeamMemberId, TeamRole};

use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub shop_id: ShopId,
    pub user_email: Email,
    pub role: TeamRole,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

/// Invite form; role defaults to editor.
#[derive(Debug, Deserialize)]
pub struct InviteForm {
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
}

impl InviteForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid email or unknown role.
    pub fn validate(&self) -> Result<(Email, TeamRole), ValidationError> {
        let email = Email::parse(&self.email)
            .map_err(|e| ValidationError::new(format!("Invite email: {e}")))?;
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => TeamRole::default(),
            Some(raw) => raw
                .parse::<TeamRole>()
                .map_err(|e| ValidationError::new(e.to_string()))?,
        };
        Ok((email, role))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_defaults_to_editor() {
        let form = InviteForm {
            email: "staff@shop.com".to_string(),
            role: None,
        };
        let (email, role) = form.validate().unwrap();
        assert_eq!(email.as_str(), "staff@shop.com");
        assert_eq!(role, TeamRole::Editor);
    }

    #[test]
    fn test_invite_rejects_bad_input() {
        let form = InviteForm {
            email: "staff".to_string(),
            role: None,
        };
        assert!(form.validate().is_err());

        let form = InviteForm {
            email: "staff@shop.com".to_string(),
            role: Some("owner".to_string()),
        };
        assert!(form.validate().is_err());
    }
}
