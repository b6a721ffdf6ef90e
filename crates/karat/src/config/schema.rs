use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    /// Database file; `None` means `~/.karat/data/karat.db`.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_display_id_width")]
    pub display_id_width: usize,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

fn default_display_id_width() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            display_id_width: default_display_id_width(),
            pagination: PaginationConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_page_size() -> u64 {
    25
}

fn default_max_page_size() -> u64 {
    200
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PaginationConfig {
    /// Applies the default page size and clamps to the maximum.
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

/// SKU image compression settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageConfig {
    /// Longest edge after compression, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_max_dimension() -> u32 {
    1024
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamps() {
        let p = PaginationConfig::default();
        assert_eq!(p.page_size(None), 25);
        assert_eq!(p.page_size(Some(0)), 1);
        assert_eq!(p.page_size(Some(5000)), 200);
        assert_eq!(p.page_size(Some(50)), 50);
    }
}
