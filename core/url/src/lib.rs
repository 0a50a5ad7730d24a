// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Endpoint descriptors.
//!
//! A [`Url`] names a protocol, host, port, path and a set of parameters. It is
//! an immutable value: every derivation returns a fresh descriptor and leaves
//! the original untouched, which makes it safe to share across threads and to
//! use (through [`Url::to_service_string`]) as a cache key.

pub mod constants;
pub mod descriptor;
pub mod errors;

pub use descriptor::Url;
pub use errors::UrlError;
