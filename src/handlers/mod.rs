pub mod admin;
pub mod audits;
pub mod auth;
pub mod charts;
pub mod common;
pub mod movements;
pub mod navigation;
pub mod nonconformities;
pub mod returns;
pub mod tco;
pub mod toners;
pub mod units;
pub mod warranties;
pub mod work_instructions;

use crate::events::EventSender;
use crate::services::{
    audits::AuditService, charts::ChartService, movements::MovementService,
    nonconformities::NonConformityService, returns::ReturnedUnitService, tco::TcoService,
    toners::TonerService, units::UnitService, users::UserService, warranties::WarrantyService,
    work_instructions::WorkInstructionService,
};
use crate::{db::DbPool, storage::ObjectStorage};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub toners: Arc<TonerService>,
    pub units: Arc<UnitService>,
    pub returns: Arc<ReturnedUnitService>,
    pub warranties: Arc<WarrantyService>,
    pub nonconformities: Arc<NonConformityService>,
    pub tco: Arc<TcoService>,
    pub audits: Arc<AuditService>,
    pub movements: Arc<MovementService>,
    pub work_instructions: Arc<WorkInstructionService>,
    pub charts: Arc<ChartService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            toners: Arc::new(TonerService::new(db_pool.clone(), event_sender.clone())),
            units: Arc::new(UnitService::new(db_pool.clone(), event_sender.clone())),
            returns: Arc::new(ReturnedUnitService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            warranties: Arc::new(WarrantyService::new(db_pool.clone(), event_sender.clone())),
            nonconformities: Arc::new(NonConformityService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            tco: Arc::new(TcoService::new(db_pool.clone(), event_sender.clone())),
            audits: Arc::new(AuditService::new(db_pool.clone(), event_sender.clone())),
            movements: Arc::new(MovementService::new(db_pool.clone(), event_sender.clone())),
            work_instructions: Arc::new(WorkInstructionService::new(
                db_pool.clone(),
                event_sender.clone(),
                storage,
            )),
            charts: Arc::new(ChartService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool, event_sender)),
        }
    }
}
