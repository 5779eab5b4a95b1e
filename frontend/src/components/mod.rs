pub mod handlers;
pub mod header;
pub mod intake_form;
pub mod preview_area;
pub mod results;
pub mod status;
pub mod upload_section;
pub mod utils;
