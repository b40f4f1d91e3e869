pub mod app_user;
pub mod audit_form;
pub mod audit_item;
pub mod audit_record;
pub mod audit_response;
pub mod audit_section;
pub mod nc_sequence;
pub mod non_conformity;
pub mod returned_unit;
pub mod stock_movement;
pub mod tco;
pub mod tco_indirect_cost;
pub mod tco_operational_cost;
pub mod toner;
pub mod unit;
pub mod user_permission;
pub mod warranty_claim;
pub mod work_instruction;
pub mod work_instruction_version;
