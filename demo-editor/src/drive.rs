use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use drive_auth_axum::AuthorizedClient;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v2/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v2/files";
const DRIVE_ABOUT_URL: &str = "https://www.googleapis.com/drive/v2/about";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
pub(crate) struct FileParams {
    file_id: Option<String>,
}

// The user is already authenticated on these routes; a Drive failure is a
// downstream-call failure, never a reason to redirect back into consent.
fn bad_gateway(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Drive call failed: {e}");
    (StatusCode::BAD_GATEWAY, "Drive request failed.".to_string())
}

fn missing_parameter() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, "Required parameter missing.".to_string())
}

async fn fetch_json(request: reqwest::RequestBuilder) -> Result<Value, (StatusCode, String)> {
    let response = request.send().await.map_err(bad_gateway)?;
    let status = response.status();
    if !status.is_success() {
        return Err(bad_gateway(format!("Drive responded {status}")));
    }
    response.json().await.map_err(bad_gateway)
}

/// GET /svc?file_id=... : file metadata with the document body inlined as a
/// `content` field.
pub(crate) async fn get_file(
    Extension(client): Extension<AuthorizedClient>,
    Query(params): Query<FileParams>,
) -> Result<Response, (StatusCode, String)> {
    let file_id = params.file_id.ok_or_else(missing_parameter)?;

    let metadata = fetch_json(client.get(&format!(
        "{DRIVE_FILES_URL}/{}",
        urlencoding::encode(&file_id)
    )))
    .await?;

    let content = match metadata.get("downloadUrl").and_then(Value::as_str) {
        Some(download_url) => {
            let download_url = download_url.to_string();
            let response = client.get(&download_url).send().await.map_err(bad_gateway)?;
            if !response.status().is_success() {
                return Err(bad_gateway(format!(
                    "Content download responded {}",
                    response.status()
                )));
            }
            response.text().await.map_err(bad_gateway)?
        }
        None => String::new(),
    };

    Ok(Json(attach_content(metadata, content)?).into_response())
}

// Drive can hand back any JSON with a 2xx; only an object can carry the
// inlined document body.
fn attach_content(mut metadata: Value, content: String) -> Result<Value, (StatusCode, String)> {
    let Some(fields) = metadata.as_object_mut() else {
        return Err(bad_gateway("File response was not a JSON object"));
    };
    fields.insert("content".to_string(), Value::String(content));
    Ok(metadata)
}

/// POST /svc : create the file's metadata, then upload its content.
pub(crate) async fn create_file(
    Extension(client): Extension<AuthorizedClient>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    let metadata = file_metadata(&body);
    let created = fetch_json(client.post(DRIVE_FILES_URL).json(&metadata)).await?;

    let file_id = created
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_gateway("Insert response carried no file id"))?
        .to_string();

    upload_content(&client, &file_id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": file_id }))).into_response())
}

/// PUT /svc?file_id=... : update metadata and content of an existing file.
pub(crate) async fn update_file(
    Extension(client): Extension<AuthorizedClient>,
    Query(params): Query<FileParams>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    // Ruby and PHP clients disagree on where the id goes; accept both.
    let file_id = params
        .file_id
        .or_else(|| {
            body.get("id")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .ok_or_else(missing_parameter)?;

    let metadata = file_metadata(&body);
    let updated = fetch_json(
        client
            .put(&format!(
                "{DRIVE_FILES_URL}/{}",
                urlencoding::encode(&file_id)
            ))
            .json(&metadata),
    )
    .await?;

    upload_content(&client, &file_id, &body).await?;
    Ok(Json(updated).into_response())
}

/// GET /user : the signed-in user's profile.
pub(crate) async fn user_info(
    Extension(client): Extension<AuthorizedClient>,
) -> Result<Response, (StatusCode, String)> {
    Ok(Json(fetch_json(client.get(USERINFO_URL)).await?).into_response())
}

/// GET /about : Drive account information, including quota.
pub(crate) async fn about(
    Extension(client): Extension<AuthorizedClient>,
) -> Result<Response, (StatusCode, String)> {
    Ok(Json(fetch_json(client.get(DRIVE_ABOUT_URL)).await?).into_response())
}

fn file_metadata(body: &Value) -> Value {
    let mut metadata = json!({
        "title": body.get("title").and_then(Value::as_str).unwrap_or("Untitled document"),
        "mimeType": body.get("mimeType").and_then(Value::as_str).unwrap_or("text/plain"),
    });
    if let Some(description) = body.get("description") {
        metadata["description"] = description.clone();
    }
    if let Some(folder_id) = body.get("parents").and_then(Value::as_str) {
        metadata["parents"] = json!([{ "id": folder_id }]);
    }
    metadata
}

async fn upload_content(
    client: &AuthorizedClient,
    file_id: &str,
    body: &Value,
) -> Result<(), (StatusCode, String)> {
    let Some(content) = body.get("content").and_then(Value::as_str) else {
        return Ok(());
    };

    let response = client
        .put(&format!(
            "{DRIVE_UPLOAD_URL}/{}?uploadType=media",
            urlencoding::encode(file_id)
        ))
        .header("Content-Type", "text/plain")
        .body(content.to_string())
        .send()
        .await
        .map_err(bad_gateway)?;

    if !response.status().is_success() {
        return Err(bad_gateway(format!(
            "Content upload responded {}",
            response.status()
        )));
    }
    Ok(())
}
