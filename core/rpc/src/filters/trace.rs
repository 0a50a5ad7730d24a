// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::{CONSUMER, PROVIDER, TRACE_ID_KEY};
use crate::errors::RpcError;
use crate::filter::Filter;
use crate::invocation::{Invocation, RpcResult};
use crate::invoker::Invoker;

/// Correlation id propagation.
///
/// Reads the `traceId` attachment of the invocation and generates a new one
/// when it is missing or blank. The id is written back to the invocation
/// before forwarding, so every later filter, the transport and the remote
/// side see it, and it is copied onto the result.
#[derive(Debug, Clone)]
pub struct TraceFilter {
    side: &'static str,
}

impl TraceFilter {
    pub fn consumer() -> Self {
        TraceFilter { side: CONSUMER }
    }

    pub fn provider() -> Self {
        TraceFilter { side: PROVIDER }
    }

    pub fn side(&self) -> &str {
        self.side
    }
}

impl Filter for TraceFilter {
    fn invoke(&self, next: &dyn Invoker, invocation: &mut Invocation) -> Result<RpcResult, RpcError> {
        let trace_id = match invocation.attachment(TRACE_ID_KEY).map(str::trim) {
            Some(id) if !id.is_empty() => {
                debug!(trace_id = id, side = self.side, "propagating trace id");
                id.to_string()
            }
            _ => {
                let id = Uuid::new_v4().to_string();
                debug!(trace_id = %id, side = self.side, "generated trace id");
                id
            }
        };
        invocation.set_attachment(TRACE_ID_KEY, trace_id.clone());

        info!(
            trace_id = %trace_id,
            side = self.side,
            interface = next.interface(),
            method = invocation.method_name(),
            "invocation"
        );

        let mut result = next.invoke(invocation)?;
        result.set_attachment_if_absent(TRACE_ID_KEY, trace_id);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::ServiceInvoker;
    use serde_json::{Value, json};
    use tracing_test::traced_test;
    use weave_url::Url;

    fn echo_trace_id() -> ServiceInvoker {
        let url: Url = "local://127.0.0.1/demo.Trace".parse().unwrap();
        ServiceInvoker::new("demo.Trace", url, |inv| {
            Ok(inv
                .attachment(TRACE_ID_KEY)
                .map(|id| json!(id))
                .unwrap_or(Value::Null))
        })
    }

    #[test]
    #[traced_test]
    fn test_generates_trace_id_when_missing() {
        let filter = TraceFilter::consumer();
        let mut inv = Invocation::new("call", vec![]).with_attachment(TRACE_ID_KEY, "  ");

        let res = filter.invoke(&echo_trace_id(), &mut inv).unwrap();

        let id = inv.attachment(TRACE_ID_KEY).unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(res.value(), &json!(id));
        assert_eq!(res.attachment(TRACE_ID_KEY), Some(id.as_str()));
        assert!(logs_contain("generated trace id"));
    }

    #[test]
    #[traced_test]
    fn test_propagates_existing_trace_id() {
        let filter = TraceFilter::provider();
        let mut inv = Invocation::new("call", vec![]).with_attachment(TRACE_ID_KEY, "abc-123");

        let res = filter.invoke(&echo_trace_id(), &mut inv).unwrap();

        assert_eq!(inv.attachment(TRACE_ID_KEY), Some("abc-123"));
        assert_eq!(res.value(), &json!("abc-123"));
        assert!(logs_contain("propagating trace id"));
    }
}
