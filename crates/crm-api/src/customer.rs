use super::{error::ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use crm_db::models::{ActionResult, CustomerRecord, CustomerWithNotes};

pub mod all {
    use super::*;

    pub async fn get(
        State(app_state): State<AppState>,
    ) -> Result<Json<Vec<CustomerRecord>>, ApiError> {
        Ok(Json(app_state.store.list_customers().await?))
    }
}

pub mod by_id {
    use super::*;

    pub async fn get(
        State(app_state): State<AppState>,
        Path(customer_id): Path<String>,
    ) -> Result<Json<CustomerWithNotes>, ApiError> {
        Ok(Json(
            app_state.store.load_customer_with_notes(&customer_id).await?,
        ))
    }
}

/// Serves all four `filterBy`/`sortBy` route shapes. A segment that is
/// absent or `*` contributes an empty list.
pub mod filtered {
    use super::*;
    use crm_db::{FilterClause, SortClause};
    use serde::de::DeserializeOwned;

    #[derive(serde::Deserialize)]
    pub struct Descriptors {
        #[serde(default)]
        filter: Option<String>,
        #[serde(default)]
        sort: Option<String>,
    }

    pub async fn get(
        State(app_state): State<AppState>,
        Path(descriptors): Path<Descriptors>,
    ) -> Result<Json<Vec<CustomerRecord>>, ApiError> {
        let filters = parse_list::<FilterClause>(descriptors.filter.as_deref(), "filter")?;
        let sorts = parse_list::<SortClause>(descriptors.sort.as_deref(), "sort")?;
        Ok(Json(
            app_state
                .store
                .list_customers_filtered(&filters, &sorts)
                .await?,
        ))
    }

    pub(crate) fn parse_list<T: DeserializeOwned>(
        raw: Option<&str>,
        what: &str,
    ) -> Result<Vec<T>, ApiError> {
        match raw.map(str::trim) {
            None | Some("") | Some("*") => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|err| {
                ApiError::bad_request(format!("The {what} is not a valid JSON list: {err}"))
            }),
        }
    }
}

pub mod status {
    use super::*;

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StatusUpdate {
        customer_id: Option<String>,
        old_status: Option<String>,
        new_status: Option<String>,
    }

    pub async fn patch(
        State(app_state): State<AppState>,
        payload: Result<Json<StatusUpdate>, JsonRejection>,
    ) -> Result<Json<ActionResult>, ApiError> {
        const ACTION: &str = "update the status";
        let Json(StatusUpdate {
            customer_id,
            old_status,
            new_status,
        }) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        let (Some(customer_id), Some(old_status), Some(new_status)) = (
            present(customer_id),
            present(old_status),
            present(new_status),
        ) else {
            return Err(ApiError::missing_parameter(ACTION));
        };
        Ok(Json(
            app_state
                .store
                .update_customer_status(&customer_id, &old_status, &new_status)
                .await?,
        ))
    }
}

/// An empty string counts as a missing parameter
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
