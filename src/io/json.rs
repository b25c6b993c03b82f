use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::harmonic::{Base, Sample};

/// JSONファイルからサンプル列を読み込む
///
/// The file holds one array. Each element is either a bare number (its index is
/// its position), an `[index, value]` pair, or an `{"index", "value"}` object.
pub fn read_samples<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    let json_value: Value = serde_json::from_reader(reader).map_err(Error::Json)?;
    parse_samples(json_value)
}

/// 解析済みJSONをサンプル列に変換する
pub fn parse_samples(json_value: Value) -> Result<Vec<Sample>> {
    let array = match json_value {
        Value::Array(array) => array,
        _ => {
            return Err(Error::Format(
                "sample file must contain a JSON array".to_string(),
            ))
        }
    };

    array
        .iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Number(_) => Sample::checked(position as f64, number_at(item, position)?),
            Value::Array(pair) if pair.len() == 2 => {
                Sample::checked(number_at(&pair[0], position)?, number_at(&pair[1], position)?)
            }
            Value::Object(map) => read_record(map, position),
            _ => Err(Error::Format(format!(
                "element {} is neither a number, an [index, value] pair nor a record",
                position
            ))),
        })
        .collect()
}

/// モデルの要約をJSONファイルに書き込む
pub fn write_model<P: AsRef<Path>>(base: &Base, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &base.snapshot()).map_err(Error::Json)?;

    Ok(())
}

// {"index": .., "value": ..} 形式の要素
fn read_record(map: &Map<String, Value>, position: usize) -> Result<Sample> {
    let field = |name: &str| {
        map.get(name).ok_or_else(|| {
            Error::Format(format!("element {} is missing the '{}' field", position, name))
        })
    };
    Sample::checked(
        number_at(field("index")?, position)?,
        number_at(field("value")?, position)?,
    )
}

fn number_at(value: &Value, position: usize) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        Error::Format(format!(
            "element {} holds a non-numeric value: {}",
            position, value
        ))
    })
}
