use serde::{Deserialize, Serialize};
use std::fmt;

/// 上传表中的原始商品编码 (数字列可能被读成整数、浮点或字符串)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProductId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawProductId {
    /// 规整为可比较的连接键，失败时返回原因
    pub fn normalize(&self) -> Result<ProductId, String> {
        match self {
            Self::Integer(v) => Ok(ProductId(v.to_string())),
            Self::Float(v) => normalize_float(*v),
            Self::Text(s) => normalize_text(s),
        }
    }
}

impl fmt::Display for RawProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RawProductId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for RawProductId {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for RawProductId {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// 规整后的商品编码 (连接键)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// f64 能精确表示的最大整数
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

fn normalize_float(v: f64) -> Result<ProductId, String> {
    if !v.is_finite() {
        return Err(format!("non-finite product id {v}"));
    }
    if v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT_INT {
        return Ok(ProductId((v as i64).to_string()));
    }
    Ok(ProductId(v.to_string()))
}

fn normalize_text(s: &str) -> Result<ProductId, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("empty product id".to_string());
    }
    if trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("none") {
        return Err(format!("null-like product id '{trimmed}'"));
    }

    // 纯数字编码与整数同键："001"、"1"、"1.0" 均为 "1"
    if let Some(key) = canonical_integer(trimmed) {
        return Ok(ProductId(key));
    }
    if let Some((int_part, frac_part)) = trimmed.split_once('.') {
        if !frac_part.is_empty() && frac_part.bytes().all(|b| b == b'0') {
            if let Some(key) = canonical_integer(int_part) {
                return Ok(ProductId(key));
            }
        }
    }

    Ok(ProductId(trimmed.to_string()))
}

/// 可带符号的十进制数字串 → 与 `i64::to_string` 一致的形式。
/// 按文本处理，超出 i64 范围的长编码同样适用且不丢精度
fn canonical_integer(text: &str) -> Option<String> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    Some(match (significant.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{significant}"),
        (false, false) => significant.to_string(),
    })
}
