use super::{customer::present, error::ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use crm_db::models::{ActionResult, CustomerNote};

pub mod by_id {
    use super::*;

    pub async fn get(
        State(app_state): State<AppState>,
        Path(note_id): Path<String>,
    ) -> Result<Json<CustomerNote>, ApiError> {
        Ok(Json(app_state.store.load_note_by_id(&note_id).await?))
    }
}

pub mod by_customer {
    use super::*;

    pub async fn get(
        State(app_state): State<AppState>,
        Path(customer_id): Path<String>,
    ) -> Result<Json<Vec<CustomerNote>>, ApiError> {
        Ok(Json(
            app_state.store.list_notes_by_customer(&customer_id).await?,
        ))
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    customer_id: Option<String>,
    note_content: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    note_id: Option<String>,
    customer_id: Option<String>,
    old_note_content: Option<String>,
    new_note_content: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRemoval {
    note_id: Option<String>,
    customer_id: Option<String>,
    note_content: Option<String>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn put(
    State(app_state): State<AppState>,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> Result<Json<ActionResult>, ApiError> {
    let NewNote {
        customer_id,
        note_content,
    } = body(payload)?;
    let (Some(customer_id), Some(content)) = (present(customer_id), present(note_content)) else {
        return Err(ApiError::missing_parameter("add the note"));
    };
    Ok(Json(app_state.store.add_note(&customer_id, &content).await?))
}

pub async fn patch(
    State(app_state): State<AppState>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> Result<Json<ActionResult>, ApiError> {
    let NoteUpdate {
        note_id,
        customer_id,
        old_note_content,
        new_note_content,
    } = body(payload)?;
    let (Some(note_id), Some(customer_id), Some(old_content), Some(new_content)) = (
        present(note_id),
        present(customer_id),
        present(old_note_content),
        present(new_note_content),
    ) else {
        return Err(ApiError::missing_parameter("update the note"));
    };
    Ok(Json(
        app_state
            .store
            .update_note(&note_id, &customer_id, &old_content, &new_content)
            .await?,
    ))
}

pub async fn delete(
    State(app_state): State<AppState>,
    payload: Result<Json<NoteRemoval>, JsonRejection>,
) -> Result<Json<ActionResult>, ApiError> {
    let NoteRemoval {
        note_id,
        customer_id,
        note_content,
    } = body(payload)?;
    let (Some(note_id), Some(customer_id), Some(content)) =
        (present(note_id), present(customer_id), present(note_content))
    else {
        return Err(ApiError::missing_parameter("delete the note"));
    };
    Ok(Json(
        app_state
            .store
            .delete_note(&note_id, &customer_id, &content)
            .await?,
    ))
}
