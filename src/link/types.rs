use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{LinkModel, LinkOwner};
use crate::policy::LinkProjection;
use crate::user::models::UserModel;

/// Request body for shortening a URL. The URL is stored as given; nothing
/// validates or normalizes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub original_url: String,
}

/// Owner fields included in link responses. Never carries the credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkOwnerView {
    pub user_id: String,
    pub username: String,
}

impl From<&UserModel> for LinkOwnerView {
    fn from(user: &UserModel) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
        }
    }
}

impl From<&LinkOwner> for LinkOwnerView {
    fn from(owner: &LinkOwner) -> Self {
        Self {
            user_id: owner.user_id.clone(),
            username: owner.username.clone(),
        }
    }
}

/// Response projection of a link. The usage metadata is only present under
/// the full projection; the reduced projection omits it entirely.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub link_id: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_hits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_on: Option<DateTime<Utc>>,
    pub owner: LinkOwnerView,
}

impl LinkView {
    pub fn project(link: &LinkModel, owner: LinkOwnerView, projection: LinkProjection) -> Self {
        let (num_hits, last_accessed_on) = match projection {
            LinkProjection::Full => (Some(link.num_hits), Some(link.last_accessed_on)),
            LinkProjection::Reduced => (None, None),
        };

        Self {
            link_id: link.link_id.clone(),
            original_url: link.original_url.clone(),
            num_hits,
            last_accessed_on,
            owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_link() -> LinkModel {
        let mut link = LinkModel::new("https://example.com", "abcdefghi", "user-1");
        link.num_hits = 7;
        link
    }

    fn test_owner() -> LinkOwnerView {
        LinkOwnerView {
            user_id: "user-1".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_full_projection_includes_usage_metadata() {
        let view = LinkView::project(&test_link(), test_owner(), LinkProjection::Full);

        assert_eq!(view.num_hits, Some(7));
        assert!(view.last_accessed_on.is_some());
    }

    #[test]
    fn test_reduced_projection_omits_usage_metadata() {
        let view = LinkView::project(&test_link(), test_owner(), LinkProjection::Reduced);

        assert_eq!(view.num_hits, None);
        assert_eq!(view.last_accessed_on, None);

        // The omitted fields disappear from the JSON instead of being null
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("numHits"));
        assert!(!json.contains("lastAccessedOn"));
        assert!(json.contains("\"linkId\""));
        assert!(json.contains("\"originalUrl\""));
    }

    #[test]
    fn test_shorten_request_uses_camel_case() {
        let request: ShortenRequest =
            serde_json::from_str(r#"{"originalUrl": "https://example.com"}"#).unwrap();

        assert_eq!(request.original_url, "https://example.com");
    }
}
