//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn language() -> String {
    "en".into()
}

pub fn extra_files() -> Vec<String> {
    Vec::new()
}

pub fn css_files() -> Vec<String> {
    vec![
        "https://fonts.googleapis.com/css?family=Source+Code+Pro:400,400i,600%7CSource+Sans+Pro:400,400i,600,600i".into(),
        "presentation.css".into(),
    ]
}
