//! Call parameters and bodies.

use std::collections::BTreeMap;

use campus_cache::CacheKey;
use campus_transport::{MultipartForm, RequestBody, RequestDescriptor};
use serde::Serialize;
use serde_json::Value;

use crate::registry::{EndpointSpec, Operation};
use crate::ApiError;

/// Path parameters of a call, kept ordered so cache keys are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Just an `id`.
    pub fn id(id: impl ToString) -> Self {
        Self::new().with("id", id)
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    /// Value of parameter `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON form used in cache keys; `null` when empty.
    pub fn to_value(&self) -> Value {
        if self.0.is_empty() {
            return Value::Null;
        }
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// One invocation of an [`Operation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub params: Params,
    pub body: RequestBody,
}

impl Call {
    /// A call with no parameters and no body.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            params: Params::new(),
            body: RequestBody::Empty,
        }
    }

    /// Add a path parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params = self.params.with(name, value);
        self
    }

    /// Shorthand for `param("id", id)`.
    pub fn id(self, id: impl ToString) -> Self {
        self.param("id", id)
    }

    /// Send `value` as the JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(value).map_err(|e| {
            ApiError::InvalidInput {
                operation: self.operation.name(),
                reason: e.to_string(),
            }
        })?);
        Ok(self)
    }

    /// Send `form` as the multipart body.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// This call's row in the endpoint table.
    pub fn spec(&self) -> &'static EndpointSpec {
        self.operation.spec()
    }

    /// Cache key: operation name plus parameters.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_operation(self.operation.name(), &self.params.to_value())
    }

    /// Build the transport request.
    ///
    /// Multipart endpoints require a multipart body; every other endpoint
    /// rejects one.
    pub fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        let spec = self.spec();
        match (&self.body, spec.multipart) {
            (RequestBody::Multipart(_), false) => {
                return Err(self.invalid("endpoint does not accept multipart bodies"))
            }
            (RequestBody::Json(_), true) | (RequestBody::Empty, true) => {
                return Err(self.invalid("endpoint requires a multipart body"))
            }
            _ => {}
        }

        let mut request = RequestDescriptor::new(spec.method, spec.render_path(&self.params)?);
        request.auth = spec.auth;
        request.body = self.body.clone();
        Ok(request)
    }

    fn invalid(&self, reason: &str) -> ApiError {
        ApiError::InvalidInput {
            operation: self.operation.name(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_transport::{AuthMode, Method};
    use serde_json::json;

    #[test]
    fn test_cache_key_is_stable() {
        let a = Call::new(Operation::UpdateStudentStatus)
            .param("studentId", "s1")
            .param("id", "p1");
        let b = Call::new(Operation::UpdateStudentStatus)
            .param("id", "p1")
            .param("studentId", "s1");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key().as_str(),
            r#"updateStudentStatus({"id":"p1","studentId":"s1"})"#
        );
        assert_eq!(
            Call::new(Operation::GetAllEvents).cache_key().as_str(),
            "getAllEvents()"
        );
    }

    #[test]
    fn test_descriptor() {
        let call = Call::new(Operation::UpdateComplaintStatus)
            .id(12)
            .json(&json!({"status": "resolved"}))
            .unwrap();
        let request = call.descriptor().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "/complaints/update-status/12");
        assert_eq!(request.auth, AuthMode::Bearer);
        assert_eq!(request.body, RequestBody::Json(json!({"status": "resolved"})));
    }

    #[test]
    fn test_login_is_anonymous() {
        let request = Call::new(Operation::Login)
            .json(&json!({"username": "ana", "password": "pw"}))
            .unwrap()
            .descriptor()
            .unwrap();
        assert!(!request.wants_credential());
    }

    #[test]
    fn test_body_shape_is_checked() {
        let err = Call::new(Operation::CreateEvent)
            .json(&json!({"title": "x"}))
            .unwrap()
            .descriptor()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { operation: "createEvent", .. }));

        let err = Call::new(Operation::CreateComplaint)
            .multipart(MultipartForm::new().text("title", "x"))
            .descriptor()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { .. }));
    }
}
