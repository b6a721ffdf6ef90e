pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod ids;
pub mod imaging;
pub mod models;
pub mod seed;
pub mod store;
pub mod workflow;

pub use aggregate::{Aggregation, OrderStatusAggregator, UnanimousAggregator};
pub use config::{load_config, load_config_or_default, Config};
pub use db::Database;
pub use error::{
    AllocationError, ConfigError, ImageError, KaratError, Result, WorkflowError,
};
pub use events::{JobTransitionEvent, TransitionBroadcaster};
pub use models::{Job, Lot, LotKind, Order, OrderLine};
pub use store::{ErpStore, JobAction, ListResponse};
pub use workflow::{
    job_route, order_status_for_job_status, phase_for_status, phase_info, resolve_phase,
    JobPhase, JobStatus, OrderStatus, PhaseInfo,
};
