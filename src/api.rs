use crate::images::ImageDiff;
use crate::meta::{MetaBlob, MetaValue};
use crate::session::Credentials;
use crate::statics;
use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Failures surfaced by the repository client. Every failure is terminal for
/// that operation: no retry, no backoff, the user re-triggers manually.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned HTTP {code}: {message}")]
    Status { code: u16, message: String },
    #[error("{0}")]
    Service(String),
    #[error(
        "malformed server response: {0} \
         (if layer metadata is plain text, the service must send it as a quoted JSON string)"
    )]
    Parse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct YearEra {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub era: String,
}

/// An empire record, normalized from either the camelCase or the snake_case
/// wire spelling (both occur, depending on the endpoint).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Empire {
    #[serde(alias = "object_id", default)]
    pub object_id: String,
    #[serde(alias = "empire_name", default)]
    pub empire_name: String,
    #[serde(alias = "start_year", default)]
    pub start_year: YearEra,
    #[serde(alias = "end_year", default)]
    pub end_year: YearEra,
    #[serde(default)]
    pub content: Option<MetaValue>,
}

impl Empire {
    /// Geographic content for the read-only viewer. Stored either as
    /// structured JSON or as a JSON-bearing string; classified once here.
    pub fn content_blob(&self) -> Option<MetaBlob> {
        match &self.content {
            None => None,
            Some(MetaValue::String(s)) => Some(MetaBlob::classify(s)),
            Some(v) => Some(MetaBlob::Json(v.clone())),
        }
    }
}

/// Outgoing empire payload for create/update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpirePayload {
    pub empire_name: String,
    pub start_year: YearEra,
    pub end_year: YearEra,
    pub content: MetaValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// A geo layer, normalized: the service spells the geographic content
/// `geoFileContent` or `content` and the metadata `metadataContent` or
/// `metadata` depending on the endpoint, and ids arrive as strings or
/// numbers.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub id: String,
    pub layer_name: String,
    pub layer_type: String,
    pub geo_content: Option<MetaBlob>,
    pub metadata_content: Option<MetaBlob>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Content for a layer create/update: name, type, the geo document, and
/// optional metadata text, each with the file name to submit under.
#[derive(Debug, Clone)]
pub struct LayerUpload {
    pub layer_name: String,
    pub layer_type: String,
    pub geo_name: String,
    pub geo_text: String,
    pub metadata: Option<(String, String)>,
}

/// A metadata record, normalized from `jsonMetadata`/`textMetadata` into the
/// tagged blob the editors consume.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub id: String,
    pub blob: Option<MetaBlob>,
    pub image_file_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    response: Option<Value>,
}

/// Blocking HTTP client for the record service. Cheap to clone; every
/// remote call made by the console goes through here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL from the environment, falling back to a local service.
    pub fn from_env() -> Self {
        let base = std::env::var(statics::ENV_BASE_URL)
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        Self::new(&base)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base, statics::API_SERVICE_PREFIX, path)
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(self.url(path))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
    }

    // --- credentials ---

    /// POST the credential pair for validation. A reachable server with a
    /// rejecting answer is a `Service` error carrying its message.
    pub fn validate_creds(&self, creds: &Credentials) -> ApiResult<()> {
        let resp = self
            .http
            .post(self.url(statics::API_VALIDATE_CREDS))
            .json(creds)
            .send()?;
        let code = resp.status();
        let env: Envelope = read_json(resp)?;
        if code.is_success() && env.status == statics::API_STATUS_SUCCESS {
            Ok(())
        } else {
            Err(ApiError::Service(
                env.message
                    .unwrap_or_else(|| statics::EN_ERR_INVALID_CREDS.to_string()),
            ))
        }
    }

    // --- empires ---

    pub fn list_empires(&self) -> ApiResult<Vec<Empire>> {
        let resp = self.get(statics::API_LIST_EMPIRES).send()?;
        read_json(resp)
    }

    pub fn get_empire(&self, id: &str) -> ApiResult<Empire> {
        let path = format!("{}/{id}", statics::API_EMPIRE_BY_ID);
        let resp = self.get(&path).send()?;
        read_json(resp)
    }

    pub fn create_empire(&self, payload: &EmpirePayload) -> ApiResult<String> {
        let resp = self
            .http
            .post(self.url(statics::API_CREATE_EMPIRE))
            .json(payload)
            .send()?;
        status_message(resp)
    }

    pub fn update_empire(&self, payload: &EmpirePayload) -> ApiResult<String> {
        let resp = self
            .http
            .patch(self.url(statics::API_UPDATE_EMPIRE))
            .json(payload)
            .send()?;
        status_message(resp)
    }

    pub fn delete_empire(&self, object_id: &str) -> ApiResult<String> {
        let path = format!("{}/{object_id}", statics::API_DELETE_EMPIRE);
        let resp = self.http.delete(self.url(&path)).send()?;
        status_message(resp)
    }

    // --- layers ---

    pub fn list_layers(&self) -> ApiResult<Vec<Layer>> {
        let resp = self.get(statics::API_LIST_LAYERS).send()?;
        let env: Envelope = read_json(resp)?;
        layers_from_envelope(env)
    }

    pub fn search_layers(&self, layer_name: &str, layer_type: &str) -> ApiResult<Vec<Layer>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if !layer_name.is_empty() {
            query.push((statics::API_FIELD_LAYER_NAME, layer_name));
        }
        if !layer_type.is_empty() {
            query.push((statics::API_FIELD_LAYER_TYPE, layer_type));
        }
        let resp = self.get(statics::API_SEARCH_LAYERS).query(&query).send()?;
        let env: Envelope = read_json(resp)?;
        layers_from_envelope(env)
    }

    pub fn create_layer(&self, upload: &LayerUpload) -> ApiResult<String> {
        let form = layer_form(upload)?;
        let resp = self
            .http
            .post(self.url(statics::API_CREATE_LAYER))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .multipart(form)
            .send()?;
        status_message(resp)
    }

    pub fn update_layer(&self, id: &str, upload: &LayerUpload) -> ApiResult<String> {
        let form = layer_form(upload)?;
        let path = format!("{}/{id}", statics::API_UPDATE_LAYER);
        let resp = self
            .http
            .patch(self.url(&path))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .multipart(form)
            .send()?;
        status_message(resp)
    }

    pub fn delete_layer(&self, id: &str) -> ApiResult<String> {
        let path = format!("{}/{id}", statics::API_DELETE_LAYER);
        let resp = self
            .http
            .delete(self.url(&path))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .send()?;
        status_message(resp)
    }

    // --- metadata ---

    /// The `objectId -> metadataId` assignment map that splits empires into
    /// assigned and unassigned on the metadata screen.
    pub fn metadata_map(&self) -> ApiResult<HashMap<String, String>> {
        let resp = self.get(statics::API_METADATA_MAP).send()?;
        let env: Envelope = read_json(resp)?;
        let mut map = HashMap::new();
        if let Some(Value::Object(entries)) = env.response {
            for (object_id, metadata_id) in entries {
                map.insert(object_id, value_to_string(&metadata_id));
            }
        }
        Ok(map)
    }

    pub fn metadata_by_id(&self, id: &str) -> ApiResult<MetadataRecord> {
        let path = format!("{}/{id}", statics::API_METADATA_BY_ID);
        let resp = self.get(&path).send()?;
        let env: Envelope = read_json(resp)?;
        let raw = env
            .response
            .ok_or_else(|| ApiError::Parse("missing response body".to_string()))?;
        Ok(normalize_metadata(&raw))
    }

    /// One multipart POST per record: object id, staged images, and the
    /// details document as an attached JSON file.
    pub fn create_metadata(
        &self,
        object_id: &str,
        details: &MetaValue,
        images: &[crate::images::StagedImage],
    ) -> ApiResult<String> {
        let mut form = Form::new()
            .text(statics::API_FIELD_OBJECT_ID, object_id.to_string())
            .part(statics::API_FIELD_DETAILS_FILE, details_part(details)?);
        for staged in images {
            form = form.part(statics::API_FIELD_IMAGES, image_part(staged)?);
        }
        let resp = self
            .http
            .post(self.url(statics::API_CREATE_METADATA))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .multipart(form)
            .send()?;
        status_message(resp)
    }

    /// The single commit of an editing session: the attribute document plus
    /// the image diff, in one PATCH.
    pub fn update_metadata(
        &self,
        id: &str,
        details: &MetaValue,
        diff: &ImageDiff<'_>,
    ) -> ApiResult<String> {
        let mut form = Form::new().part(statics::API_FIELD_DETAILS_FILE, details_part(details)?);
        for staged in diff.new_files {
            form = form.part(statics::API_FIELD_NEW_IMAGES, image_part(staged)?);
        }
        for file_name in diff.remove_ids {
            form = form.text(statics::API_FIELD_REMOVE_IMAGE_IDS, file_name.clone());
        }
        let resp = self
            .http
            .patch(self.url(statics::API_UPDATE_METADATA))
            .query(&[("id", id)])
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .multipart(form)
            .send()?;
        status_message(resp)
    }

    pub fn delete_metadata(&self, id: &str) -> ApiResult<String> {
        let path = format!("{}/{id}", statics::API_DELETE_METADATA);
        let resp = self
            .http
            .delete(self.url(&path))
            .header(statics::API_CLIENT_HEADER, statics::API_CLIENT_NAME)
            .send()?;
        status_message(resp)
    }

    pub fn fetch_image(&self, file_name: &str) -> ApiResult<Vec<u8>> {
        let path = format!("{}/{file_name}", statics::API_FETCH_IMAGE);
        let resp = self.get(&path).send()?;
        let code = resp.status();
        if !code.is_success() {
            return Err(ApiError::Status {
                code: code.as_u16(),
                message: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

fn details_part(details: &MetaValue) -> ApiResult<Part> {
    Ok(Part::bytes(details.to_pretty().into_bytes())
        .file_name(statics::FILE_DEFAULT_DETAILS)
        .mime_str("application/json")?)
}

fn image_part(staged: &crate::images::StagedImage) -> ApiResult<Part> {
    Ok(Part::bytes(staged.bytes.clone())
        .file_name(staged.file_name.clone())
        .mime_str("application/octet-stream")?)
}

fn layer_form(upload: &LayerUpload) -> ApiResult<Form> {
    let mut form = Form::new()
        .text(statics::API_FIELD_LAYER_NAME, upload.layer_name.clone())
        .text(statics::API_FIELD_LAYER_TYPE, upload.layer_type.clone())
        .part(
            statics::API_FIELD_GEO_LAYER_FILE,
            Part::bytes(upload.geo_text.clone().into_bytes())
                .file_name(upload.geo_name.clone())
                .mime_str("application/json")?,
        );
    if let Some((name, text)) = &upload.metadata {
        form = form.part(
            statics::API_FIELD_GEO_LAYER_METADATA,
            Part::bytes(text.clone().into_bytes())
                .file_name(name.clone())
                .mime_str("text/plain")?,
        );
    }
    Ok(form)
}

/// Decode a response body as JSON after the HTTP status check. A body that
/// fails to parse is the known interop hazard, reported as `Parse`.
fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::blocking::Response) -> ApiResult<T> {
    let code = resp.status();
    let text = resp.text()?;
    if !code.is_success() {
        return Err(ApiError::Status {
            code: code.as_u16(),
            message: snippet(&text),
        });
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Mutation responses carry a `{status, message}` envelope; unwrap it into
/// the human-readable outcome line or the matching error.
fn status_message(resp: reqwest::blocking::Response) -> ApiResult<String> {
    let env: Envelope = read_json(resp)?;
    if env.status == statics::API_STATUS_FAILURE {
        return Err(ApiError::Service(
            env.message.unwrap_or_else(|| "request failed".to_string()),
        ));
    }
    Ok(env.message.unwrap_or(env.status))
}

fn layers_from_envelope(env: Envelope) -> ApiResult<Vec<Layer>> {
    if env.status == statics::API_STATUS_FAILURE {
        return Err(ApiError::Service(
            env.message.unwrap_or_else(|| "request failed".to_string()),
        ));
    }
    let Some(Value::Array(items)) = env.response else {
        return Ok(Vec::new());
    };
    Ok(items.iter().map(normalize_layer).collect())
}

fn snippet(text: &str) -> String {
    let mut s = text.trim().to_string();
    if s.len() > 200 {
        s.truncate(197);
        s.push_str("...");
    }
    s
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stored content field -> tagged blob. Empty strings and empty containers
/// count as absent, matching how the service pads missing metadata.
fn blob_from_wire(v: &Value) -> Option<MetaBlob> {
    match v {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(MetaBlob::classify(s)),
        other => {
            let meta = serde_json::from_value::<MetaValue>(other.clone()).ok()?;
            if meta.is_empty_container() {
                return None;
            }
            Some(MetaBlob::Json(meta))
        }
    }
}

pub fn normalize_layer(raw: &Value) -> Layer {
    let field = |name: &str| raw.get(name).cloned().unwrap_or(Value::Null);
    let text_field = |name: &str| match field(name) {
        Value::Null => String::new(),
        v => value_to_string(&v),
    };
    let geo_content = raw
        .get("geoFileContent")
        .filter(|v| !v.is_null())
        .or_else(|| raw.get("content"))
        .and_then(blob_from_wire);
    let metadata_content = raw
        .get("metadataContent")
        .filter(|v| !v.is_null())
        .or_else(|| raw.get("metadata"))
        .and_then(blob_from_wire);
    Layer {
        id: text_field("id"),
        layer_name: text_field("layerName"),
        layer_type: text_field("layerType"),
        geo_content,
        metadata_content,
        created_at: raw.get("createdAt").and_then(Value::as_str).map(String::from),
        updated_at: raw.get("updatedAt").and_then(Value::as_str).map(String::from),
    }
}

pub fn normalize_metadata(raw: &Value) -> MetadataRecord {
    let blob = match raw.get("jsonMetadata") {
        Some(v) if !v.is_null() => blob_from_wire(v),
        _ => raw
            .get("textMetadata")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| MetaBlob::Text(s.to_string())),
    };
    let image_file_ids = raw
        .get("imageFileIds")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_to_string).collect())
        .unwrap_or_default();
    MetadataRecord {
        id: raw.get("id").map(value_to_string).unwrap_or_default(),
        blob,
        image_file_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::{Empire, normalize_layer, normalize_metadata};
    use crate::meta::MetaBlob;
    use serde_json::json;

    #[test]
    fn empire_deserializes_both_wire_spellings() {
        let camel: Empire = serde_json::from_str(
            r#"{"objectId":"abc","empireName":"Maurya","startYear":{"year":322,"era":"BCE"},"endYear":{"year":185,"era":"BCE"}}"#,
        )
        .unwrap();
        assert_eq!(camel.object_id, "abc");
        assert_eq!(camel.start_year.year, 322);

        let snake: Empire = serde_json::from_str(
            r#"{"object_id":"abc","empire_name":"Maurya","start_year":{"year":322,"era":"BCE"},"end_year":{"year":185,"era":"BCE"}}"#,
        )
        .unwrap();
        assert_eq!(snake.empire_name, "Maurya");
        assert_eq!(snake.end_year.era, "BCE");
    }

    #[test]
    fn layer_normalization_prefers_geo_file_content() {
        let raw = json!({
            "id": 7,
            "layerName": "Yamuna",
            "layerType": "River",
            "geoFileContent": {"type": "FeatureCollection", "features": []},
            "metadataContent": "plain notes",
            "updatedAt": "2024-05-01T10:00:00Z"
        });
        let layer = normalize_layer(&raw);
        assert_eq!(layer.id, "7");
        assert!(matches!(layer.geo_content, Some(MetaBlob::Json(_))));
        assert_eq!(
            layer.metadata_content,
            Some(MetaBlob::Text("plain notes".to_string()))
        );
        assert_eq!(layer.updated_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn layer_normalization_falls_back_to_alternate_fields() {
        let raw = json!({
            "id": "x1",
            "layerName": "Ridge",
            "layerType": "Mountain",
            "content": "{\"type\":\"Feature\"}",
            "metadata": {}
        });
        let layer = normalize_layer(&raw);
        // A JSON-bearing string classifies as structured content.
        assert!(matches!(layer.geo_content, Some(MetaBlob::Json(_))));
        // An empty metadata object counts as absent.
        assert_eq!(layer.metadata_content, None);
    }

    #[test]
    fn metadata_normalization_tags_json_and_text() {
        let raw = json!({
            "id": 12,
            "jsonMetadata": {"Founder": "Augustus"},
            "imageFileIds": ["a.png", "b.png"]
        });
        let rec = normalize_metadata(&raw);
        assert_eq!(rec.id, "12");
        assert!(matches!(rec.blob, Some(MetaBlob::Json(_))));
        assert_eq!(rec.image_file_ids, vec!["a.png", "b.png"]);

        let raw = json!({"id": "13", "textMetadata": "free text"});
        let rec = normalize_metadata(&raw);
        assert_eq!(rec.blob, Some(MetaBlob::Text("free text".to_string())));
        assert!(rec.image_file_ids.is_empty());
    }

    #[test]
    fn metadata_normalization_handles_absent_blob() {
        let raw = json!({"id": 1, "imageFileIds": []});
        let rec = normalize_metadata(&raw);
        assert!(rec.blob.is_none());
    }
}
