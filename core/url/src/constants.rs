// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

// Well-known parameter keys
pub const INTERFACE_KEY: &str = "interface";
pub const GROUP_KEY: &str = "group";
pub const VERSION_KEY: &str = "version";
pub const APPLICATION_KEY: &str = "application";
pub const SIDE_KEY: &str = "side";
pub const PID_KEY: &str = "pid";
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Descriptor of a provider, embedded into a registry descriptor on export.
pub const EXPORT_KEY: &str = "export";
/// Descriptor of a consumer, embedded into a registry descriptor on refer.
pub const REFER_KEY: &str = "refer";

/// Separator used by list-valued parameters.
pub const COMMA_SEPARATOR: char = ',';
