use serde::{Deserialize, Serialize};

/// Display style of an announcement category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType {
    pub icon: String,
    /// Canonical `#RRGGBB`
    pub color_hex: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageTypeError {
    #[error("message type name cannot be empty")]
    EmptyName,
    #[error("`{0}` is not a valid hex color (expected something like #5865F2)")]
    InvalidColor(String),
    #[error("message type icon cannot be empty")]
    EmptyIcon,
}

impl MessageType {
    pub fn new(icon: &str, color: &str) -> Result<Self, MessageTypeError> {
        let icon = icon.trim();
        if icon.is_empty() {
            return Err(MessageTypeError::EmptyIcon);
        }
        let value = parse_color(color)?;
        Ok(Self {
            icon: icon.to_string(),
            color_hex: format_color(value),
        })
    }

    /// 24-bit color value for embeds
    pub fn color(&self) -> u32 {
        // color_hex is validated on construction and on load
        parse_color(&self.color_hex).unwrap_or_default()
    }
}

/// Lower-case, trim, and join words with underscores so lookups stay stable
pub fn normalize_name(name: &str) -> Result<String, MessageTypeError> {
    let normalized = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    if normalized.is_empty() {
        Err(MessageTypeError::EmptyName)
    } else {
        Ok(normalized)
    }
}

/// Parse `#RRGGBB`, `RRGGBB` or `0xRRGGBB` into a 24-bit value
pub fn parse_color(input: &str) -> Result<u32, MessageTypeError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = || MessageTypeError::InvalidColor(input.to_string());

    if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    u32::from_str_radix(digits, 16).map_err(|_| invalid())
}

pub fn format_color(value: u32) -> String {
    format!("#{:06X}", value & 0xFF_FFFF)
}

/// Built-in catalog installed on first run
pub fn default_message_types() -> Vec<(&'static str, MessageType)> {
    let entry = |icon: &str, color: &str| MessageType {
        icon: icon.to_string(),
        color_hex: color.to_string(),
    };

    vec![
        ("announcement", entry("📢", "#5865F2")),
        ("update", entry("🔄", "#3498DB")),
        ("event", entry("🎉", "#9B59B6")),
        ("warning", entry("⚠️", "#E67E22")),
        ("maintenance", entry("🛠️", "#95A5A6")),
    ]
}
