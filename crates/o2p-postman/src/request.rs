use o2p_core::collection::{
    Body, ExampleResponse, Header, PathVariable, QueryParam, Request, RequestItem, Url,
};
use o2p_core::parse::media_type::MediaType;
use o2p_core::parse::operation::{Operation, PathItem};
use o2p_core::parse::parameter::{Parameter, ParameterLocation};
use o2p_core::parse::schema::SchemaOrRef;
use serde_json::Value;

use crate::example::{SampleMode, media_example, placeholder};

/// Host every generated request points at; resolved through the `baseUrl` variable.
pub const BASE_URL_HOST: &str = "{{baseUrl}}";

/// Build one request node for `method path`.
pub fn build_request(
    path: &str,
    method: &str,
    item: &PathItem,
    operation: &Operation,
) -> RequestItem {
    let parameters = merged_parameters(&item.parameters, &operation.parameters);

    let mut header: Vec<Header> = parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Header)
        .map(|p| Header {
            key: p.name.clone(),
            value: parameter_value(p),
            description: p.description.clone(),
        })
        .collect();

    let mut body = None;
    if let Some((content_type, media)) = operation
        .request_body
        .as_ref()
        .and_then(|b| b.content.first())
    {
        header.push(Header::new("Content-Type", content_type.as_str()));
        if is_json(content_type) {
            body = media_example(media, SampleMode::Request).map(|v| Body::json(pretty(&v)));
        }
    }

    if let Some(accept) = operation
        .responses
        .values()
        .find_map(|r| r.content.keys().next())
    {
        header.push(Header::new("Accept", accept.as_str()));
    }

    RequestItem {
        id: None,
        name: request_name(path, method, operation),
        request: Request {
            method: method.to_string(),
            header,
            body,
            url: build_url(path, &parameters),
            auth: None,
            description: operation
                .description
                .clone()
                .or_else(|| item.description.clone()),
        },
        response: build_responses(operation),
    }
}

/// `summary`, else `operationId`, else `METHOD path`.
pub fn request_name(path: &str, method: &str, operation: &Operation) -> String {
    operation
        .summary
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| operation.operation_id.clone())
        .unwrap_or_else(|| format!("{method} {path}"))
}

/// Path-level parameters overridden by operation-level ones with the same name and location.
fn merged_parameters(path_level: &[Parameter], operation_level: &[Parameter]) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = path_level
        .iter()
        .filter(|p| {
            !operation_level
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    merged.extend(operation_level.iter().cloned());
    merged
}

fn build_url(path: &str, parameters: &[Parameter]) -> Url {
    let mut variable = Vec::new();
    let segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match template_name(segment) {
            Some(name) => {
                let declared = parameters
                    .iter()
                    .find(|p| p.location == ParameterLocation::Path && p.name == name);
                variable.push(PathVariable {
                    key: name.to_string(),
                    value: declared.map(parameter_value).unwrap_or_default(),
                    description: declared.and_then(|p| p.description.clone()),
                });
                format!(":{name}")
            }
            None => segment.to_string(),
        })
        .collect();

    let query = parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .map(|p| QueryParam {
            key: p.name.clone(),
            value: Some(parameter_value(p)),
            description: p.description.clone(),
        })
        .collect();

    Url {
        raw: None,
        host: vec![BASE_URL_HOST.to_string()],
        path: segments,
        query,
        variable,
    }
}

/// `{eventId}` -> `eventId`.
fn template_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn parameter_value(parameter: &Parameter) -> String {
    if let Some(example) = &parameter.example {
        return scalar(example);
    }
    match &parameter.schema {
        Some(SchemaOrRef::Schema(schema)) => schema
            .example
            .as_ref()
            .or(schema.default_value.as_ref())
            .or(schema.enum_values.first())
            .map(scalar)
            .unwrap_or_else(|| placeholder(schema)),
        _ => "<string>".to_string(),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn build_responses(operation: &Operation) -> Vec<ExampleResponse> {
    operation
        .responses
        .iter()
        .filter_map(|(status, response)| {
            let Ok(code) = status.parse::<u16>() else {
                log::debug!("no example response for non-numeric status {status}");
                return None;
            };
            let content = response.content.first();
            let json = content.is_some_and(|(content_type, _)| is_json(content_type));
            let preview_language = if json { "json" } else { "text" };
            Some(ExampleResponse {
                name: if response.description.is_empty() {
                    status.clone()
                } else {
                    response.description.clone()
                },
                status: reason_phrase(code).to_string(),
                code,
                preview_language: Some(preview_language.to_string()),
                header: content
                    .map(|(content_type, _)| {
                        vec![Header::new("Content-Type", content_type.as_str())]
                    })
                    .unwrap_or_default(),
                body: content.and_then(|(_, media)| response_body(media, json)),
            })
        })
        .collect()
}

fn response_body(media: &MediaType, json: bool) -> Option<String> {
    let value = media_example(media, SampleMode::Response)?;
    Some(if json { pretty(&value) } else { scalar(&value) })
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence == "application/json" || essence.ends_with("+json")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        410 => "Gone",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path_item(value: Value) -> PathItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_name_fallbacks() {
        let mut operation = Operation {
            summary: Some("List events".to_string()),
            operation_id: Some("listEvents".to_string()),
            ..Operation::default()
        };
        assert_eq!(request_name("/events", "GET", &operation), "List events");
        operation.summary = None;
        assert_eq!(request_name("/events", "GET", &operation), "listEvents");
        operation.operation_id = None;
        assert_eq!(request_name("/events", "GET", &operation), "GET /events");
    }

    #[test]
    fn test_path_template_becomes_variable() {
        let item = path_item(json!({
            "parameters": [
                { "name": "eventId", "in": "path", "required": true,
                  "schema": { "type": "string", "format": "uuid" } }
            ],
            "get": {
                "parameters": [
                    { "name": "embed", "in": "query", "schema": { "type": "boolean", "default": false } },
                    { "name": "Accept-Language", "in": "header", "schema": { "type": "string", "example": "nl" } }
                ],
                "responses": { "200": { "description": "OK" } }
            }
        }));
        let operation = item.get.as_ref().unwrap();
        let request = build_request("/events/{eventId}", "GET", &item, operation);

        let url = &request.request.url;
        assert_eq!(url.host, vec!["{{baseUrl}}"]);
        assert_eq!(url.path, vec!["events", ":eventId"]);
        assert_eq!(url.variable[0].key, "eventId");
        assert_eq!(url.variable[0].value, "<uuid>");
        assert_eq!(url.query, vec![QueryParam::new("embed", "false")]);
        assert_eq!(url.raw, None);
        assert_eq!(
            request.request.header,
            vec![Header::new("Accept-Language", "nl")]
        );
        assert_eq!(request.response.len(), 1);
        assert_eq!(request.response[0].status, "OK");
    }

    #[test]
    fn test_operation_parameter_overrides_path_parameter() {
        let item = path_item(json!({
            "parameters": [{ "name": "page", "in": "query", "example": 1 }],
            "get": {
                "parameters": [{ "name": "page", "in": "query", "example": 5 }],
                "responses": {}
            }
        }));
        let request = build_request("/events", "GET", &item, item.get.as_ref().unwrap());
        assert_eq!(
            request.request.url.query,
            vec![QueryParam::new("page", "5")]
        );
    }

    #[test]
    fn test_json_body_and_example_responses() {
        let item = path_item(json!({
            "post": {
                "summary": "Create event",
                "requestBody": {
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string", "readOnly": true },
                                    "name": { "type": "string" }
                                }
                            }
                        }
                    }
                },
                "responses": {
                    "201": {
                        "description": "Created",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": { "id": { "type": "string", "readOnly": true } }
                                }
                            }
                        }
                    },
                    "default": { "description": "Error" }
                }
            }
        }));
        let request = build_request("/events", "POST", &item, item.post.as_ref().unwrap());

        let body = request.request.body.as_ref().expect("json body");
        assert_eq!(body.mode, "raw");
        assert_eq!(
            serde_json::from_str::<Value>(&body.raw).unwrap(),
            json!({ "name": "<string>" })
        );
        assert!(
            request
                .request
                .header
                .contains(&Header::new("Content-Type", "application/json"))
        );

        assert_eq!(request.response.len(), 1);
        let created = &request.response[0];
        assert_eq!(created.code, 201);
        assert_eq!(created.status, "Created");
        assert_eq!(created.preview_language.as_deref(), Some("json"));
        assert_eq!(
            serde_json::from_str::<Value>(created.body.as_deref().unwrap()).unwrap(),
            json!({ "id": "<string>" })
        );
    }

    #[test]
    fn test_json_detection() {
        assert!(is_json("application/json"));
        assert!(is_json("application/ld+json; charset=utf-8"));
        assert!(!is_json("text/plain"));
    }
}
