use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapGeoError {
    /// 文字認識エンジンが起動できない（リクエスト全体が失敗）
    #[error("文字認識エンジンを利用できません: {0}")]
    EngineUnavailable(String),

    /// 1回分の認識の失敗（スイープ内では空文字として吸収される）
    #[error("文字認識エラー: {0}")]
    Recognition(String),

    #[error("画像を読み込めません: {0}")]
    MalformedImage(String),

    #[error("処理が中断されました")]
    Cancelled,

    #[error("処理がタイムアウトしました（{0}ミリ秒）")]
    Timeout(u128),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] snapgeo_common::Error),
}

pub type Result<T> = std::result::Result<T, SnapGeoError>;
