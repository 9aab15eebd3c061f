use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::repository::ColumnValues;
use crate::database::Query;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Partial patch of profile attributes. Identity, role and timestamps are
/// never patchable through this endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

impl ProfilePatch {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("country", &self.country),
            ("city", &self.city),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ApiError::field_error(field, "Cannot be empty"));
                }
            }
        }
        Ok(())
    }

    fn into_columns(self) -> ColumnValues {
        let mut columns: ColumnValues = Vec::new();
        if let Some(full_name) = self.full_name {
            columns.push(("full_name", full_name.into()));
        }
        if let Some(phone) = self.phone {
            columns.push(("phone", phone.into()));
        }
        if let Some(country) = self.country {
            columns.push(("country", country.into()));
        }
        if let Some(city) = self.city {
            columns.push(("city", city.into()));
        }
        if let Some(address) = self.address {
            columns.push(("address", address.into()));
        }
        columns
    }
}

/// GET /api/profile - the caller's profile
pub async fn show(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>, ApiError> {
    let profile = state
        .profiles
        .find_one(Query::new().eq("id", user.id))
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PUT /api/profile - partially update the caller's profile
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProfilePatch>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let columns = payload.into_columns();
    if columns.is_empty() {
        return show(State(state), user).await;
    }

    let profile = state.profiles.update(user.id, columns).await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_includes_only_present_fields() {
        let patch = ProfilePatch {
            city: Some("Douala".to_string()),
            ..Default::default()
        };
        let columns = patch.into_columns();
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["city"]);
    }

    #[test]
    fn rejects_blank_required_fields() {
        let patch = ProfilePatch {
            full_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
