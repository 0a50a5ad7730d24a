// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

/// Descriptor parameter listing the filters requested for an exported service.
pub const SERVICE_FILTER_KEY: &str = "service-filter";
/// Descriptor parameter listing the filters requested for a service reference.
pub const REFERENCE_FILTER_KEY: &str = "reference-filter";

// Filter groups
pub const PROVIDER: &str = "provider";
pub const CONSUMER: &str = "consumer";

/// Scheme of the registry meta-protocol. Invokers addressed with it are
/// never wrapped in a filter chain.
pub const REGISTRY_PROTOCOL: &str = "registry";

/// Pseudo extension name standing for all automatically activated extensions.
pub const DEFAULT_KEY: &str = "default";
pub const REMOVE_VALUE_PREFIX: char = '-';

/// Capability name of the filter extension point.
pub const FILTER_CAPABILITY: &str = "filter";

/// Attachment carrying the correlation id of a call.
pub const TRACE_ID_KEY: &str = "traceId";
