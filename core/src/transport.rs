//! Default transport over the blocking reqwest client.

use reqwest::blocking::multipart;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};

/// `HttpTransport` implementation backed by `reqwest::blocking::Client`.
///
/// reqwest does not convert non-2xx statuses into errors, so every status
/// reaches the client's classifier as data. Connection reuse comes from the
/// shared inner client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Multipart {
                field,
                file_name,
                content,
            }) => {
                let part = multipart::Part::bytes(content).file_name(file_name);
                builder.multipart(multipart::Form::new().part(field, part))
            }
            None => builder,
        };

        let response = builder
            .send()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
