//! Human-readable display IDs (`ORD-0001`, `JOB-0042`, `LOT-0003`).

use std::sync::LazyLock;

use regex::Regex;

static RE_SKU_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{1,31}$").unwrap());

pub const ORDER_PREFIX: &str = "ORD";
pub const JOB_PREFIX: &str = "JOB";
pub const LOT_PREFIX: &str = "LOT";

/// Zero-padded display ID; numbers wider than `width` are not truncated.
pub fn format_display_id(prefix: &str, number: i64, width: usize) -> String {
    format!("{}-{:0width$}", prefix, number, width = width)
}

/// SKU codes are upper-case alphanumerics with dashes, e.g. `RING-HALO-01`.
pub fn is_valid_sku_code(code: &str) -> bool {
    RE_SKU_CODE.is_match(code)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
