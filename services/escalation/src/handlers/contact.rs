use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkin_auth_types::identity::IdentityHeaders;

use crate::domain::types::Contact;
use crate::error::CheckInServiceError;
use crate::state::AppState;
use crate::usecase::contact::{CreateContactInput, CreateContactUseCase, ListContactsUseCase};

#[derive(Serialize)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
            phone: c.phone,
            email: c.email,
            created_at: c.created_at,
        }
    }
}

// ── POST /contacts ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn create_contact(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), CheckInServiceError> {
    let usecase = CreateContactUseCase {
        repo: state.contact_repo(),
    };
    let contact = usecase
        .execute(
            identity.owner_id,
            CreateContactInput {
                name: body.name,
                phone: body.phone,
                email: body.email,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(contact.into())))
}

// ── GET /contacts ────────────────────────────────────────────────────────────

pub async fn list_contacts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, CheckInServiceError> {
    let usecase = ListContactsUseCase {
        repo: state.contact_repo(),
    };
    let contacts = usecase.execute(identity.owner_id).await?;
    Ok(Json(contacts.into_iter().map(ContactResponse::from).collect()))
}
