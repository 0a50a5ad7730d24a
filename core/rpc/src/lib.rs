// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod chain;
pub mod constants;
pub mod errors;
pub mod extension;
pub mod filter;
pub mod filters;
pub mod invocation;
pub mod invoker;
pub mod protocol;

pub use chain::{FilterChainNode, build_chain, build_invoker_chain};
pub use errors::{ExtensionError, RpcError, ServiceException};
pub use extension::{Activate, ExtensionLoader, ExtensionSelector};
pub use filter::Filter;
pub use invocation::{Invocation, RpcResult};
pub use invoker::{Invoker, ServiceInvoker};
pub use protocol::filter_wrapper::ProtocolFilterWrapper;
pub use protocol::local::LocalProtocol;
pub use protocol::{Exporter, Protocol};
