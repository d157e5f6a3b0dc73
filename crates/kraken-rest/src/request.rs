//! Request trait and structure verification
//!
//! Every endpoint is a [`Request`]: a [`Model`] plus the HTTP facts needed to
//! send it. Endpoints embedded inside another request (children) declare no
//! path or method of their own.

use kraken_types::{Location, Model, ModelResult, Value};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{RestError, RestResult, StructureError};
use crate::transport::Method;

/// A request model bound to an endpoint
pub trait Request {
    fn model(&self) -> &Model;

    fn model_mut(&mut self) -> &mut Model;

    /// Whether this request is embedded inside another request
    ///
    /// `None` means the type never declared it, which fails verification.
    fn is_child(&self) -> Option<bool> {
        None
    }

    fn method(&self) -> Option<Method> {
        None
    }

    fn path(&self) -> Option<&'static str> {
        None
    }

    /// Whether the request must carry `API-Key`/`API-Sign` headers
    fn authenticate(&self) -> bool {
        true
    }

    /// Example response envelope used in mock mode, as JSON text
    fn factory_response(&self) -> Option<String> {
        None
    }

    fn skip_structure_verification(&self) -> bool {
        false
    }

    /// Name of the request type
    fn type_name(&self) -> &'static str {
        self.model().schema().name()
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.model().get(field)
    }

    fn set(&mut self, field: &str, value: impl Into<Value>) -> ModelResult<()>
    where
        Self: Sized,
    {
        self.model_mut().set(field, value)
    }

    fn properties_in(&self, location: Location) -> JsonMap<String, JsonValue> {
        self.model().properties_in(location)
    }

    /// Verify structure, then render in wire shape
    fn to_wire(&self) -> RestResult<JsonValue> {
        verify_structure(self)?;
        Ok(self.model().to_wire())
    }
}

/// Check that a request declares what it must, once per instance
///
/// Non-child requests need a method and a path. The result is cached on the
/// model, so later calls are free.
pub fn verify_structure<R: Request + ?Sized>(request: &R) -> Result<(), StructureError> {
    if request.skip_structure_verification() || request.model().structure_verified() {
        return Ok(());
    }

    let name = request.type_name();
    match request.is_child() {
        None => return Err(StructureError::IsChildNotImplemented(name)),
        Some(true) => {}
        Some(false) => {
            if request.method().is_none() {
                return Err(StructureError::MethodNotImplemented(name));
            }
            if request.path().is_none() {
                return Err(StructureError::PathNotImplemented(name));
            }
        }
    }

    request.model().mark_structure_verified();
    Ok(())
}

/// Self-test for a request type
///
/// A default instance must render to a wire object, and a declared factory
/// response must be a JSON object.
pub fn check<R: Request + Default>() -> RestResult<()> {
    let request = R::default();

    if !request.model().to_wire().is_object() {
        return Err(RestError::Parse(format!(
            "{} does not render to an object",
            request.type_name()
        )));
    }

    if let Some(path) = request.path() {
        if path.is_empty() {
            return Err(StructureError::PathNotImplemented(request.type_name()).into());
        }
    }

    if let Some(text) = request.factory_response() {
        let parsed: JsonValue = serde_json::from_str(&text)?;
        if !parsed.is_object() {
            return Err(RestError::Parse(format!(
                "{} factory response is not an object",
                request.type_name()
            )));
        }
    }

    Ok(())
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random transaction id shaped like `XXXXXX-XXXXX-XXXXXX`
pub fn gen_tx_id() -> String {
    format!(
        "{}-{}-{}",
        random_alphanumeric(6),
        random_alphanumeric(5),
        random_alphanumeric(6)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kraken_types::{FieldSchema, ModelSchema};

    static PROBE: ModelSchema = ModelSchema::new("Probe", &[FieldSchema::char("pair")]);

    struct Probe {
        model: Model,
        child: Option<bool>,
        method: Option<Method>,
        path: Option<&'static str>,
        skip: bool,
    }

    impl Default for Probe {
        fn default() -> Self {
            Self {
                model: Model::new(&PROBE),
                child: Some(false),
                method: Some(Method::Get),
                path: Some("/0/public/Time"),
                skip: false,
            }
        }
    }

    impl Request for Probe {
        fn model(&self) -> &Model {
            &self.model
        }
        fn model_mut(&mut self) -> &mut Model {
            &mut self.model
        }
        fn is_child(&self) -> Option<bool> {
            self.child
        }
        fn method(&self) -> Option<Method> {
            self.method
        }
        fn path(&self) -> Option<&'static str> {
            self.path
        }
        fn skip_structure_verification(&self) -> bool {
            self.skip
        }
    }

    #[test]
    fn test_complete_request_verifies_once() {
        let probe = Probe::default();
        assert!(!probe.model().structure_verified());
        verify_structure(&probe).unwrap();
        assert!(probe.model().structure_verified());
    }

    #[test]
    fn test_missing_capabilities() {
        let probe = Probe {
            child: None,
            ..Probe::default()
        };
        assert_eq!(
            verify_structure(&probe),
            Err(StructureError::IsChildNotImplemented("Probe"))
        );

        let probe = Probe {
            method: None,
            ..Probe::default()
        };
        assert_eq!(
            verify_structure(&probe),
            Err(StructureError::MethodNotImplemented("Probe"))
        );

        let probe = Probe {
            path: None,
            ..Probe::default()
        };
        assert_eq!(
            verify_structure(&probe),
            Err(StructureError::PathNotImplemented("Probe"))
        );
    }

    #[test]
    fn test_child_is_exempt() {
        let probe = Probe {
            child: Some(true),
            method: None,
            path: None,
            ..Probe::default()
        };
        assert!(verify_structure(&probe).is_ok());
    }

    #[test]
    fn test_skip_verification() {
        let probe = Probe {
            child: None,
            skip: true,
            ..Probe::default()
        };
        assert!(probe.to_wire().is_ok());
    }

    #[test]
    fn test_set_through_trait() {
        let mut probe = Probe::default();
        probe.set("pair", "XBTUSD").unwrap();
        assert_eq!(probe.get("pair"), Some(&Value::from("XBTUSD")));
        assert!(probe.set("missing", "x").is_err());
    }

    #[test]
    fn test_check_harness() {
        check::<Probe>().unwrap();
    }

    #[test]
    fn test_tx_id_shape() {
        let id = gen_tx_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![6, 5, 6]);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_alphanumeric())));
    }
}
