pub mod capture_panel;
pub mod crop_overlay;
pub mod header;
pub mod step_indicator;
pub mod thesis_form;
pub mod toasts;
