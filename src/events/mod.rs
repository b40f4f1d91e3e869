use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor is gone.
    /// Registry writes are already committed when events go out.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

/// Domain events emitted after successful registry writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TonerCreated(Uuid),
    TonerUpdated(Uuid),
    TonerDeleted { toner_id: Uuid, returned_units: u64 },
    UnitDeleted { unit_id: Uuid, returned_units: u64 },
    ReturnedUnitRecorded(Uuid),
    WarrantyClaimCreated(Uuid),
    WarrantyClaimUpdated(Uuid),
    NonConformityOpened { id: Uuid, number: String },
    NonConformityStatusChanged {
        id: Uuid,
        old_status: String,
        new_status: String,
    },
    TcoCreated(Uuid),
    TcoUpdated(Uuid),
    AuditFormCreated(Uuid),
    AuditRecorded(Uuid),
    StockMovementRecorded(Uuid),
    WorkInstructionVersionUploaded { instruction_id: Uuid, version_id: Uuid },
    PermissionsReplaced { user_id: Uuid, count: usize },
    UserActivationChanged { user_id: Uuid, active: bool },
    RecordDeleted { registry: String, id: Uuid },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TonerCreated(_) => "toner_created",
            Event::TonerUpdated(_) => "toner_updated",
            Event::TonerDeleted { .. } => "toner_deleted",
            Event::UnitDeleted { .. } => "unit_deleted",
            Event::ReturnedUnitRecorded(_) => "returned_unit_recorded",
            Event::WarrantyClaimCreated(_) => "warranty_claim_created",
            Event::WarrantyClaimUpdated(_) => "warranty_claim_updated",
            Event::NonConformityOpened { .. } => "non_conformity_opened",
            Event::NonConformityStatusChanged { .. } => "non_conformity_status_changed",
            Event::TcoCreated(_) => "tco_created",
            Event::TcoUpdated(_) => "tco_updated",
            Event::AuditFormCreated(_) => "audit_form_created",
            Event::AuditRecorded(_) => "audit_recorded",
            Event::StockMovementRecorded(_) => "stock_movement_recorded",
            Event::WorkInstructionVersionUploaded { .. } => "work_instruction_version_uploaded",
            Event::PermissionsReplaced { .. } => "permissions_replaced",
            Event::UserActivationChanged { .. } => "user_activation_changed",
            Event::RecordDeleted { .. } => "record_deleted",
        }
    }
}

/// Drains the event channel, logging every event. Runs until all senders drop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::NonConformityStatusChanged {
                id,
                old_status,
                new_status,
            } => info!(
                event = event.name(),
                nc_id = %id,
                %old_status,
                %new_status,
                "non-conformity moved"
            ),
            Event::TonerDeleted {
                toner_id,
                returned_units,
            } if *returned_units > 0 => info!(
                event = event.name(),
                %toner_id,
                returned_units,
                "toner deleted with its returned units"
            ),
            _ => debug!(event = event.name(), payload = ?event, "event processed"),
        }
    }

    info!("Event processing loop stopped");
}
