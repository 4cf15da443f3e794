//! Hosted table client over the PostgREST HTTP API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{NewVisit, RecordId, VisitField, VisitFields, VisitRecord};

/// Default table holding the visit records.
pub const DEFAULT_TABLE: &str = "users";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP client for one hosted table.
pub struct RestStore {
    base_url: String,
    endpoint: String,
    api_key: String,
    client: Client,
    timeout_secs: u64,
}

impl RestStore {
    /// Client for `{base_url}/rest/v1/{table}`.
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout_secs: u64) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            endpoint: format!("{}/rest/v1/{}", base_url, table),
            base_url,
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request against the table with the auth headers set.
    fn request(&self, method: Method, query: &[(&str, String)]) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().map_err(|e| {
            if e.is_connect() {
                StoreError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                StoreError::Http(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                StoreError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        self.send(request)?
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn id_filter(id: RecordId) -> (&'static str, String) {
    ("id", format!("eq.{}", id))
}

impl RecordStore for RestStore {
    fn insert(&self, visit: &NewVisit) -> StoreResult<VisitRecord> {
        let request = self
            .request(Method::POST, &[])
            .header("Prefer", "return=representation")
            .json(&[visit]);

        let mut rows: Vec<VisitRecord> = self.fetch(request)?;
        if rows.is_empty() {
            return Err(StoreError::Decode("insert returned no rows".into()));
        }
        Ok(rows.swap_remove(0))
    }

    fn select_all(&self) -> StoreResult<Vec<VisitRecord>> {
        let request = self.request(
            Method::GET,
            &[("select", "*".to_string()), ("order", "id.asc".to_string())],
        );
        self.fetch(request)
    }

    fn select_column(&self, field: VisitField) -> StoreResult<Vec<String>> {
        let column = field.column();
        let request = self.request(
            Method::GET,
            &[("select", column.to_string()), ("order", "id.asc".to_string())],
        );

        let rows: Vec<Value> = self.fetch(request)?;
        Ok(rows
            .iter()
            .map(|row| {
                row.get(column)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect())
    }

    fn update(&self, id: RecordId, fields: &VisitFields) -> StoreResult<()> {
        let request = self
            .request(Method::PATCH, &[id_filter(id)])
            .header("Prefer", "return=representation")
            .json(fields);

        let rows: Vec<Value> = self.fetch(request)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        let request = self
            .request(Method::DELETE, &[id_filter(id)])
            .header("Prefer", "return=representation");

        let rows: Vec<Value> = self.fetch(request)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response; yields the raw request text.
    fn one_shot_server(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            head.push_str(&String::from_utf8_lossy(&body));

            reader.get_mut().write_all(response.as_bytes()).unwrap();
            head
        });

        (format!("http://{}", addr), handle)
    }

    fn store(base_url: &str) -> RestStore {
        RestStore::new(base_url, "anon-key", DEFAULT_TABLE, 5).unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = store("https://clinic.example.co/");
        assert_eq!(store.endpoint(), "https://clinic.example.co/rest/v1/users");
    }

    #[test]
    fn test_request_carries_auth_and_filters() {
        let store = store("https://clinic.example.co");
        let request = store
            .request(Method::DELETE, &[id_filter(RecordId(42))])
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://clinic.example.co/rest/v1/users?id=eq.42"
        );
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
    }

    #[test]
    fn test_select_all_decodes_rows() {
        let body = r#"[
            {"id": 1, "file_number": "A1", "name": "Sara", "father_name": "Reza",
             "doctor": "Dr. Karimi", "corrective_doctor": null, "services": "Filling",
             "which_tooth": null, "return_doctor": null, "return_reason": null,
             "created_at": "2026-10-18T10:00:00"}
        ]"#;
        let (url, server) = one_shot_server("200 OK", body);

        let rows = store(&url).select_all().unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("GET /rest/v1/users?select=*&order=id.asc"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, RecordId(1));
        assert_eq!(rows[0].fields.corrective_doctor, "");
    }

    #[test]
    fn test_select_column_reads_nulls_as_empty() {
        let body = r#"[{"doctor": "Dr. Karimi"}, {"doctor": null}, {}]"#;
        let (url, server) = one_shot_server("200 OK", body);

        let doctors = store(&url).select_column(VisitField::Doctor).unwrap();
        server.join().unwrap();

        assert_eq!(doctors, vec!["Dr. Karimi".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn test_insert_posts_array_and_returns_row() {
        let body = r#"[{"id": 9, "file_number": "A1", "name": "Sara",
                        "created_at": "2026-10-18T10:00:00"}]"#;
        let (url, server) = one_shot_server("201 Created", body);

        let visit = NewVisit {
            fields: VisitFields {
                file_number: "A1".into(),
                name: "Sara".into(),
                ..VisitFields::default()
            },
            created_at: "2026-10-18T10:00:00".into(),
        };
        let record = store(&url).insert(&visit).unwrap();
        let request = server.join().unwrap();

        assert_eq!(record.id, RecordId(9));
        assert!(request.starts_with("POST /rest/v1/users"));
        assert!(request.to_ascii_lowercase().contains("prefer: return=representation"));
        assert!(request.contains(r#"[{"file_number":"A1""#));
    }

    #[test]
    fn test_update_of_missing_row_is_not_found() {
        let (url, server) = one_shot_server("200 OK", "[]");

        let err = store(&url)
            .update(RecordId(3), &VisitFields::default())
            .unwrap_err();
        let request = server.join().unwrap();

        assert!(request.starts_with("PATCH /rest/v1/users?id=eq.3"));
        assert!(matches!(err, StoreError::NotFound(RecordId(3))));
    }

    #[test]
    fn test_error_status_is_reported() {
        let (url, server) = one_shot_server("401 Unauthorized", r#"{"message":"bad key"}"#);

        let err = store(&url).delete(RecordId(1)).unwrap_err();
        server.join().unwrap();

        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_store() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = store(&url).select_all().unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
