use thiserror::Error;

/// エラー型の定義
#[derive(Error, Debug)]
pub enum Error {
    #[error("振幅の範囲外の値です: 値 {value}, 振幅 {amplitude}")]
    OutOfAmplitudeRange { value: f64, amplitude: f64 },

    #[error("無効な設定です: {0}")]
    InvalidConfig(String),

    #[error("無効な入力です: {0}")]
    InvalidInput(String),

    #[error("データ形式エラー: {0}")]
    Format(String),

    #[error("データがありません: {0}")]
    EmptyData(String),

    // 外部クレートのエラー
    #[error("入出力エラー")]
    Io(#[source] std::io::Error),

    #[error("JSONエラー")]
    Json(#[source] serde_json::Error),

    #[error("CSVエラー")]
    Csv(#[source] csv::Error),

    #[error("YAMLエラー")]
    Yaml(#[source] serde_yaml::Error),

    #[error("TOMLエラー")]
    Toml(#[source] toml::de::Error),
}

/// Resultの型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}
