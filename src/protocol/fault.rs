//! Business fault translation.
//!
//! A producer reports business failures inside an otherwise successful
//! response. This module turns them into `CrsError::RemoteFault` so they never
//! reach retry or breaker accounting as successes with bad data.

use serde::{Deserialize, Serialize};

use crate::error::CrsError;

/// Fault pair carried by every response payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fault {
    pub fault_code: Option<String>,
    pub fault_string: Option<String>,
}

impl Fault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fault_code: Some(code.into()),
            fault_string: Some(message.into()),
        }
    }

    /// Blank codes count as no fault.
    pub fn code(&self) -> Option<&str> {
        self.fault_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Implemented by every response payload that can carry a fault.
pub trait FaultCarrier {
    fn fault(&self) -> &Fault;
}

/// Pass the payload through, or fail with `RemoteFault` naming `operation`.
pub fn ensure_no_fault<P: FaultCarrier>(operation: &str, payload: P) -> Result<P, CrsError> {
    let fault = payload.fault();
    match fault.code() {
        Some(code) => {
            tracing::warn!(
                operation,
                fault_code = code,
                fault_string = fault.fault_string.as_deref().unwrap_or(""),
                "Remote fault"
            );
            Err(CrsError::RemoteFault {
                operation: operation.to_string(),
                code: code.to_string(),
                message: fault.fault_string.clone(),
            })
        }
        None => Ok(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Payload(Fault);

    impl FaultCarrier for Payload {
        fn fault(&self) -> &Fault {
            &self.0
        }
    }

    #[test]
    fn test_fault_code_becomes_remote_fault() {
        let result = ensure_no_fault("GetPerson", Payload(Fault::new("E42", "not found")));
        match result {
            Err(CrsError::RemoteFault { operation, code, message }) => {
                assert_eq!(operation, "GetPerson");
                assert_eq!(code, "E42");
                assert_eq!(message.as_deref(), Some("not found"));
            }
            _ => panic!("expected RemoteFault"),
        }
    }

    #[test]
    fn test_blank_fault_code_passes_through() {
        let blank = Fault {
            fault_code: Some("   ".into()),
            fault_string: Some("ignored".into()),
        };
        assert!(ensure_no_fault("GetPerson", Payload(blank)).is_ok());
        assert!(ensure_no_fault("GetPerson", Payload(Fault::default())).is_ok());
    }
}
