//! JSON-RPC Server
//!
//! Implements the JSON-RPC 2.0 gateway over HTTP.

use crate::handler::RpcHandler;
use crate::metrics::GatewayMetrics;
use crate::types::{
    AddQueueRequest, ExportRequest, ImportRequest, PopRequest, PushRequest, SetMasterRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use keyq_core::port::Broker;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    /// 0 binds an ephemeral port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    broker: Arc<dyn Broker>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, broker: Arc<dyn Broker>) -> Self {
        Self { config, broker }
    }

    /// Build the method table
    fn module(&self) -> Result<RpcModule<()>, String> {
        let metrics =
            GatewayMetrics::new().map_err(|e| format!("Failed to set up metrics: {}", e))?;
        let shared = Arc::new(RpcHandler::new(self.broker.clone(), Arc::new(metrics)));
        let mut module = RpcModule::new(());

        let handler = shared.clone();
        module
            .register_async_method("queue.add.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: AddQueueRequest = params.one()?;
                    handler.add_queue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.set_master.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SetMasterRequest = params.one()?;
                    handler.set_master(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.push.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: PushRequest = params.one()?;
                    handler.push(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.pop.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: PopRequest = params.one()?;
                    handler.pop(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.front.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.front().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.import.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ImportRequest = params.one()?;
                    handler.import(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_async_method("queue.export.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ExportRequest = params.one()?;
                    handler.export(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Admin APIs
        let handler = shared.clone();
        module
            .register_async_method("admin.health.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.health().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = shared.clone();
        module
            .register_method("admin.metrics.v1", move |_, _, _| handler.metrics())
            .map_err(|e| e.to_string())?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the handle used to stop it.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyq_core::QueueStore;

    #[test]
    fn test_registers_every_method() {
        let server = RpcServer::new(
            RpcServerConfig::default(),
            Arc::new(QueueStore::in_memory()),
        );
        let module = server.module().unwrap();

        let mut methods: Vec<&str> = module.method_names().collect();
        methods.sort_unstable();
        assert_eq!(
            methods,
            vec![
                "admin.health.v1",
                "admin.metrics.v1",
                "queue.add.v1",
                "queue.export.v1",
                "queue.front.v1",
                "queue.import.v1",
                "queue.pop.v1",
                "queue.push.v1",
                "queue.set_master.v1",
            ]
        );
    }

    #[tokio::test]
    async fn test_start_on_ephemeral_port() {
        let server = RpcServer::new(
            RpcServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            Arc::new(QueueStore::in_memory()),
        );
        let (addr, handle) = server.start().await.unwrap();
        assert_ne!(addr.port(), 0);

        handle.stop().unwrap();
        handle.stopped().await;
    }
}
