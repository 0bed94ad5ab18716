use crate::error::{ReconError, ReconResult};
use crate::models::RawProductId;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;

/// 单元格原始值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(n) => match n.as_i64() {
                Some(v) => Cell::Integer(v),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Empty),
            },
            Value::String(s) => Cell::from_text(s),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// 上传表的松散表示：列名 + 行。列名校验之后再转换为强类型记录
#[derive(Debug, Clone)]
pub struct RawTable {
    dataset: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// 从带表头的 CSV 读取
    pub fn from_csv<R: Read>(dataset: &str, reader: R) -> ReconResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row = (0..headers.len())
                .map(|i| Cell::from_text(record.get(i).unwrap_or("")))
                .collect();
            rows.push(row);
        }

        Ok(Self {
            dataset: dataset.to_string(),
            headers,
            rows,
        })
    }

    /// 从 JSON 对象数组读取，列为所有行键的并集 (按首次出现排序)
    pub fn from_json_rows(dataset: &str, values: &[Value]) -> ReconResult<Self> {
        let mut columns: IndexSet<String> = IndexSet::new();
        for (idx, value) in values.iter().enumerate() {
            let Some(obj) = value.as_object() else {
                return Err(ReconError::InvalidValue {
                    dataset: dataset.to_string(),
                    row: idx,
                    column: "<row>".to_string(),
                    value: value.to_string(),
                });
            };
            columns.extend(obj.keys().cloned());
        }

        let rows = values
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                columns
                    .iter()
                    .map(|col| obj.get(col).map(Cell::from_json).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Ok(Self {
            dataset: dataset.to_string(),
            headers: columns.into_iter().collect(),
            rows,
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// 校验必需列，一次性报告全部缺失列
    pub fn require(&self, columns: &[&str]) -> ReconResult<Vec<usize>> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| self.position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ReconError::validation(self.dataset.clone(), missing));
        }

        Ok(columns.iter().filter_map(|c| self.position(c)).collect())
    }

    /// 第一个名称中包含 `date` 的列
    pub fn date_column(&self) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.to_ascii_lowercase().contains("date"))
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, RowView<'_>)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, cells)| (idx, RowView { table: self, index: idx, cells }))
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// 单行读取器，负责各列的类型转换
pub struct RowView<'a> {
    table: &'a RawTable,
    index: usize,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    fn cell(&self, col: usize) -> &'a Cell {
        self.cells.get(col).unwrap_or(&EMPTY_CELL)
    }

    fn invalid(&self, col: usize, value: String) -> ReconError {
        ReconError::InvalidValue {
            dataset: self.table.dataset.clone(),
            row: self.index,
            column: self.table.headers.get(col).cloned().unwrap_or_default(),
            value,
        }
    }

    pub fn text(&self, col: usize) -> Option<String> {
        match self.cell(col) {
            Cell::Empty => None,
            Cell::Integer(v) => Some(v.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.trim().to_string()),
        }
    }

    pub fn text_or_default(&self, col: usize) -> String {
        self.text(col).unwrap_or_default()
    }

    pub fn product_id(&self, col: usize) -> RawProductId {
        match self.cell(col) {
            Cell::Empty => RawProductId::Text(String::new()),
            Cell::Integer(v) => RawProductId::Integer(*v),
            Cell::Float(v) => RawProductId::Float(*v),
            Cell::Text(s) => RawProductId::Text(s.clone()),
        }
    }

    /// 整数数量；空值按 0 计，`3.0` 这类整值小数可接受
    pub fn quantity(&self, col: usize) -> ReconResult<i64> {
        match self.cell(col) {
            Cell::Empty => Ok(0),
            Cell::Integer(v) => Ok(*v),
            Cell::Float(v) => integral(*v).ok_or_else(|| self.invalid(col, v.to_string())),
            Cell::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
                    .ok_or_else(|| self.invalid(col, s.clone()))
            }
        }
    }

    /// 金额；空值按 0 计
    pub fn amount(&self, col: usize) -> ReconResult<BigDecimal> {
        match self.cell(col) {
            Cell::Empty => Ok(BigDecimal::from(0)),
            Cell::Integer(v) => Ok(BigDecimal::from(*v)),
            Cell::Float(v) => {
                if !v.is_finite() {
                    return Err(self.invalid(col, v.to_string()));
                }
                BigDecimal::from_str(&v.to_string()).map_err(|_| self.invalid(col, v.to_string()))
            }
            Cell::Text(s) => {
                BigDecimal::from_str(s.trim().trim_start_matches('₹').replace(',', "").as_str())
                    .map_err(|_| self.invalid(col, s.clone()))
            }
        }
    }

    pub fn date(&self, col: usize) -> ReconResult<Option<NaiveDate>> {
        let Some(raw) = self.text(col) else {
            return Ok(None);
        };
        parse_date(&raw)
            .map(Some)
            .ok_or_else(|| self.invalid(col, raw))
    }
}

fn integral(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
