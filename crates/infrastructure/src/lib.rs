//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod local_file_reader;
mod preset_widget_surface;
mod zoho_crm_record_gateway;

pub use local_file_reader::LocalFileReader;
pub use preset_widget_surface::PresetWidgetSurface;
pub use zoho_crm_record_gateway::ZohoCrmRecordGateway;
