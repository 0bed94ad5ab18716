use crate::error::ReconResult;
use crate::models::BenchmarkRow;
use std::io::Read;
use std::path::Path;

/// 读取公司品类基准表 (`categoryName,Company Standard`)
pub fn load_benchmark<R: Read>(reader: R) -> ReconResult<Vec<BenchmarkRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let row: BenchmarkRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn load_benchmark_file(path: impl AsRef<Path>) -> ReconResult<Vec<BenchmarkRow>> {
    let file = std::fs::File::open(path.as_ref())?;
    load_benchmark(file)
}
