pub mod header;
pub mod status_banner;
pub mod upload_area;
pub mod results_panel;
