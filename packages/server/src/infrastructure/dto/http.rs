//! HTTP API DTO

use serde::{Deserialize, Serialize};

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    50
}

/// GET /api/messages のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// POST /api/upload のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponseDto {
    /// アップロード時の元のファイル名
    pub filename: String,
    /// 保存先の URL（send_message の fileUrl にそのまま使える）
    pub url: String,
}
