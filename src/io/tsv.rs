use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::{Error, Result};
use crate::harmonic::{Base, Sample};

/// 観測値とモデルの当てはめ値をTSVファイルに書き込む
///
/// One row per sample: `index`, `observed`, `fitted`. No header.
pub fn write_expectation<P: AsRef<Path>>(samples: &[Sample], base: &Base, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    write_expectation_to(samples, base, file)
}

pub fn write_expectation_to<W: Write>(samples: &[Sample], base: &Base, writer: W) -> Result<()> {
    let mut wtr = tsv_writer(writer);

    for sample in samples {
        wtr.write_record(&[
            sample.index.to_string(),
            sample.value.to_string(),
            base.get(sample.index).to_string(),
        ])
        .map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

/// 予測列をTSVファイルに書き込む
///
/// One row per predicted position: `position`, `observed` (empty past the end
/// of history), `predicted`.
pub fn write_forecast<P: AsRef<Path>>(
    history: &[Sample],
    predictions: &[f64],
    path: P,
) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    write_forecast_to(history, predictions, file)
}

pub fn write_forecast_to<W: Write>(
    history: &[Sample],
    predictions: &[f64],
    writer: W,
) -> Result<()> {
    let mut wtr = tsv_writer(writer);

    for (position, predicted) in predictions.iter().enumerate() {
        let observed = history
            .get(position)
            .map(|s| s.value.to_string())
            .unwrap_or_default();
        wtr.write_record(&[position.to_string(), observed, predicted.to_string()])
            .map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}
