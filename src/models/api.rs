//! # 代理路由数据模型
//!
//! 定义了 HTTP 代理路由的请求体与响应体结构。
//!
//! 所有路由都遵循同一约定：客户端始终拿到一个可以分支判断的 JSON 对象，
//! 通过 `ok` 字段区分"代理报告成功"与"代理报告失败"，而不是依赖 HTTP 状态码。
//! 路由内部使用带标签的结果枚举（`CheckOutcome`、`StarsOutcome`）表达结果，
//! 在边界处统一转换为 `ApiReply`。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 模型存在性校验请求体
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface ValidateModelRequest {
///   slug: string;
///   apiKey?: string; // Ollama 路由中复用为 base URL
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// 待校验的模型 slug，缺失或为空时返回 400
    #[serde(default)]
    pub slug: Option<String>,

    /// OpenRouter 路由中为用户密钥；Ollama 路由中为服务地址
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ValidateRequest {
    /// 去空白后的 slug；缺失或为空时返回 `None`
    pub fn trimmed_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 去空白后的可选覆盖值（API Key 或 base URL）
    pub fn override_value(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 模型存在性校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// 上游返回成功，`exists` 表示是否找到完全相同的模型标识
    Checked { exists: bool },
    /// 上游返回非成功状态码，原样记录状态码但不透传给 HTTP 层
    UpstreamFailed { error: String, status: u16 },
    /// 网络错误、解析错误等意外失败
    Failed { error: String },
}

/// Star 数查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarsOutcome {
    Found { stars: Option<u64> },
    Failed,
}

/// 统一的路由响应体
///
/// 只序列化与当前结果相关的字段，例如：
/// - `{ "ok": true, "exists": false }`
/// - `{ "ok": false, "error": "upstream returned 500", "status": 500 }`
/// - `{ "ok": true, "stars": 1234 }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReply {
    /// 请求是否成功完成
    pub ok: bool,

    /// 模型是否存在，仅校验成功时出现
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    /// Star 数路由专用：外层 `Option` 表示字段是否出现，内层允许 `null`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<Option<u64>>,

    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// 上游返回的非成功状态码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// 健康检查路由专用：当前进程内的活跃请求数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_requests: Option<usize>,
}

impl ApiReply {
    fn empty(ok: bool) -> Self {
        Self {
            ok,
            exists: None,
            stars: None,
            error: None,
            status: None,
            active_requests: None,
        }
    }

    /// 本地输入校验失败（HTTP 400）使用的响应体
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(false)
        }
    }

    pub fn health(active_requests: usize) -> Self {
        Self {
            active_requests: Some(active_requests),
            ..Self::empty(true)
        }
    }
}

impl From<CheckOutcome> for ApiReply {
    fn from(outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Checked { exists } => Self {
                exists: Some(exists),
                ..Self::empty(true)
            },
            CheckOutcome::UpstreamFailed { error, status } => Self {
                error: Some(error),
                status: Some(status),
                ..Self::empty(false)
            },
            CheckOutcome::Failed { error } => Self::invalid(error),
        }
    }
}

impl From<StarsOutcome> for ApiReply {
    fn from(outcome: StarsOutcome) -> Self {
        match outcome {
            StarsOutcome::Found { stars } => Self {
                stars: Some(stars),
                ..Self::empty(true)
            },
            StarsOutcome::Failed => Self::empty(false),
        }
    }
}

/// CSP 上报路由的消息响应体：`{ "message": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReply {
    /// 提示信息
    pub message: String,
}

impl MessageReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 附加了请求元数据的 CSP 违规记录，作为一行 JSON 写入日志
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CspViolationRecord {
    /// 浏览器上报的原始 `csp-report` 对象
    pub report: Value,
    /// 接收时间：RFC 3339 格式
    pub timestamp: String,
    /// 客户端 IP：优先取 `X-Forwarded-For` 第一跳，其次 `X-Real-IP`，最后为对端地址
    pub ip: String,
    /// 客户端 `User-Agent`，缺失时为 `"unknown"`
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_outcome_shapes() {
        let found = serde_json::to_value(ApiReply::from(CheckOutcome::Checked { exists: true }))
            .unwrap();
        assert_eq!(found, json!({ "ok": true, "exists": true }));

        let upstream = serde_json::to_value(ApiReply::from(CheckOutcome::UpstreamFailed {
            error: "upstream returned 500".into(),
            status: 500,
        }))
        .unwrap();
        assert_eq!(
            upstream,
            json!({ "ok": false, "error": "upstream returned 500", "status": 500 })
        );

        let failed =
            serde_json::to_value(ApiReply::from(CheckOutcome::Failed { error: "boom".into() }))
                .unwrap();
        assert_eq!(failed, json!({ "ok": false, "error": "boom" }));
    }

    #[test]
    fn test_stars_null_is_serialized() {
        let reply = serde_json::to_value(ApiReply::from(StarsOutcome::Found { stars: None }))
            .unwrap();
        assert_eq!(reply, json!({ "ok": true, "stars": null }));

        let failed = serde_json::to_value(ApiReply::from(StarsOutcome::Failed)).unwrap();
        assert_eq!(failed, json!({ "ok": false }));
    }

    #[test]
    fn test_validate_request_trims() {
        let req: ValidateRequest =
            serde_json::from_value(json!({ "slug": "  llama3  ", "apiKey": " " })).unwrap();
        assert_eq!(req.trimmed_slug(), Some("llama3"));
        assert_eq!(req.override_value(), None);

        let empty: ValidateRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.trimmed_slug(), None);
    }
}
