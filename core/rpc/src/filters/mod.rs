// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod trace;

use std::sync::Arc;

use crate::constants::{CONSUMER, PROVIDER};
use crate::errors::ExtensionError;
use crate::extension::{Activate, ExtensionLoader};
use crate::filter::Filter;

pub use trace::TraceFilter;

pub const CONSUMER_TRACE: &str = "consumer-trace";
pub const PROVIDER_TRACE: &str = "provider-trace";

/// Register the filters shipped with the crate.
pub fn register_builtin_filters(loader: &ExtensionLoader<dyn Filter>) -> Result<(), ExtensionError> {
    loader.register_activate(
        CONSUMER_TRACE,
        Activate::new().group(CONSUMER).order(-10_000),
        || -> Arc<dyn Filter> { Arc::new(TraceFilter::consumer()) },
    )?;
    loader.register_activate(
        PROVIDER_TRACE,
        Activate::new().group(PROVIDER).order(-10_000),
        || -> Arc<dyn Filter> { Arc::new(TraceFilter::provider()) },
    )?;

    Ok(())
}
