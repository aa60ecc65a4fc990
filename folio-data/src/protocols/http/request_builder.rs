use crate::error::ClientError;

use super::rest_request::RestRequest;

/*----- */
// Authenticator
/*----- */
pub trait Authenticator {
    fn key(&self) -> &str;

    fn generate_signature(&self, request_str: &str) -> String;
}

/*----- */
// ExchangeRequestBuilder
/*----- */
pub trait ExchangeRequestBuilder {
    fn build_signed_request<Request>(
        &self,
        builder: reqwest::RequestBuilder,
        request: &Request,
    ) -> Result<reqwest::Request, ClientError>
    where
        Request: RestRequest;
}

// Url encoded query string for the request, empty when it has no params
pub fn encode_query<Request>(request: &Request) -> Result<String, ClientError>
where
    Request: RestRequest,
{
    match request.query_params() {
        Some(query_params) => Ok(serde_urlencoded::to_string(query_params)?),
        None => Ok(String::new()),
    }
}

// Json body for the request, empty when it has no body
pub fn encode_body<Request>(request: &Request) -> Result<String, ClientError>
where
    Request: RestRequest,
{
    match request.body() {
        Some(body) => serde_json::to_string(body).map_err(ClientError::Serialise),
        None => Ok(String::new()),
    }
}

/*----- */
// Public Request Builder
/*----- */
#[derive(Debug, Default, Clone)]
pub struct PublicRequestBuilder {
    headers: Vec<(&'static str, String)>,
}

impl PublicRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

impl ExchangeRequestBuilder for PublicRequestBuilder {
    fn build_signed_request<Request>(
        &self,
        mut builder: reqwest::RequestBuilder,
        request: &Request,
    ) -> Result<reqwest::Request, ClientError>
    where
        Request: RestRequest,
    {
        if let Some(query_params) = request.query_params() {
            builder = builder.query(query_params);
        }

        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }

        Ok(builder.build()?)
    }
}
