pub mod injector;

pub use injector::{InjectOutcome, inject};

/// Seam to the external intercepting-proxy runtime. A production
/// deployment wires this to whatever HTTP proxy framework actually holds
/// the in-flight request (out of scope here, see the crate's Non-goals);
/// `inject` only needs to read the request host and mutate headers or
/// short-circuit the response.
pub trait ProxyFlow {
    fn host(&self) -> String;
    fn set_request_header(&mut self, name: &str, value: &str);
    fn set_response_header(&mut self, name: &str, value: &str);
    fn respond_502(&mut self, json_body: &str);
}

/// In-memory fake used by tests and by any harness exercising the
/// injection policy without a real proxy runtime attached.
#[cfg(test)]
pub struct TestFlow {
    pub host: String,
    pub request_headers: std::collections::HashMap<String, String>,
    pub response_headers: std::collections::HashMap<String, String>,
    pub response_status: Option<u16>,
    pub response_body: Option<String>,
}

#[cfg(test)]
impl TestFlow {
    pub fn new(host: &str) -> Self {
        TestFlow {
            host: host.to_string(),
            request_headers: std::collections::HashMap::new(),
            response_headers: std::collections::HashMap::new(),
            response_status: None,
            response_body: None,
        }
    }
}

#[cfg(test)]
impl ProxyFlow for TestFlow {
    fn host(&self) -> String {
        self.host.clone()
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.request_headers.insert(name.to_string(), value.to_string());
    }

    fn set_response_header(&mut self, name: &str, value: &str) {
        self.response_headers.insert(name.to_string(), value.to_string());
    }

    fn respond_502(&mut self, json_body: &str) {
        self.response_status = Some(502);
        self.response_body = Some(json_body.to_string());
    }
}
