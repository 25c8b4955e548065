use std::sync::Arc;

use configs::{AppConfig, DocLinks};
use sea_orm::DatabaseConnection;
use service::{CounterService, InfoService};

use crate::metrics::ServiceMetrics;

/// Shared handler state. Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct ServerState {
    pub counter: Arc<CounterService>,
    pub info: Arc<InfoService>,
    pub links: Arc<DocLinks>,
    pub metrics: Arc<ServiceMetrics>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            counter: Arc::new(CounterService::new(db.clone(), cfg.defaults.stats.clone())),
            info: Arc::new(InfoService::new(db, cfg.defaults.info.clone())),
            links: Arc::new(cfg.links.clone()),
            metrics: Arc::new(ServiceMetrics::new()?),
        })
    }
}
