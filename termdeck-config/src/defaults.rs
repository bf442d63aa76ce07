//! Default value functions for `Config` fields.
//!
//! Referenced from `#[serde(default = "...")]` attributes so partially written
//! config files still deserialize.

pub fn shell() -> String {
    #[cfg(target_os = "windows")]
    {
        "powershell.exe".to_string()
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

pub fn cols() -> u16 {
    80
}

pub fn rows() -> u16 {
    24
}

pub fn cell_width() -> f32 {
    8.0
}

pub fn cell_height() -> f32 {
    16.0
}

pub fn divider_width() -> f32 {
    1.0
}

/// Roughly one display frame at 60Hz
pub fn render_debounce_ms() -> u64 {
    16
}

pub fn bool_true() -> bool {
    true
}
