mod crm_gateway;
mod file_reader;
mod surface;

pub use crm_gateway::{CrmRecordGateway, ProcedureArguments, RecordUpdate};
pub use file_reader::{SelectedFileContent, SelectedFileReader};
pub use surface::WidgetSurface;
