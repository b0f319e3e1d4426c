//! 前端页面
//!
//! 内嵌 frontend/dist 的构建产物。`/api/` 下没有匹配的路径返回 JSON 404，
//! 带扩展名却不存在的文件返回 404，其余路径交给前端路由处理（返回 index.html）。

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use rust_embed::Embed;
use std::path::Path;

use crate::models::{ApiResponse, ErrorCode};

const API_PREFIX: &str = "api/";
const INDEX: &str = "index.html";

#[derive(Embed)]
#[folder = "frontend/dist/"]
struct FrontendAssets;

/// 静态资源的缓存档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CachePolicy {
    /// assets/ 下文件名带内容哈希的构建产物
    Immutable,
    /// 校徽、图标、字体等不带哈希的公共文件
    Daily,
    /// 页面入口、manifest 和 service worker，每次都要重新验证
    Revalidate,
}

impl CachePolicy {
    fn for_path(path: &str) -> Self {
        if path.starts_with("assets/") && has_content_hash(path) {
            return Self::Immutable;
        }
        match extension(path) {
            "html" | "json" | "webmanifest" | "js" | "mjs" => Self::Revalidate,
            _ => Self::Daily,
        }
    }

    fn header_value(self) -> &'static str {
        match self {
            Self::Immutable => "public, max-age=31536000, immutable",
            Self::Daily => "public, max-age=86400",
            Self::Revalidate => "no-cache",
        }
    }
}

fn extension(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

/// 构建工具生成的文件名形如 `index-3fA9c1Qe.js`
fn has_content_hash(path: &str) -> bool {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.rsplit_once('-'))
        .is_some_and(|(_, hash)| {
            hash.len() >= 8
                && hash
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn content_type(path: &str) -> &'static str {
    match extension(path) {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "webmanifest" => "application/manifest+json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        "woff" => "font/woff",
        "csv" => "text/csv; charset=utf-8",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn asset_response(path: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type(path))
        .insert_header((
            header::CACHE_CONTROL,
            CachePolicy::for_path(path).header_value(),
        ))
        .body(body)
}

const MISSING_BUNDLE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>School System</title></head>
<body>
  <h1>School System</h1>
  <p>The API is available under <code>/api/v1</code>, but no web interface is embedded in this build.</p>
</body>
</html>"#;

pub async fn serve_frontend(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("tail").trim_start_matches('/');

    if path.starts_with(API_PREFIX) {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "API endpoint not found",
        )));
    }

    if !path.is_empty()
        && let Some(file) = FrontendAssets::get(path)
    {
        return Ok(asset_response(path, file.data.into_owned()));
    }

    // 请求的是文件但不存在，不回退到首页
    if !extension(path).is_empty() {
        return Ok(HttpResponse::NotFound().finish());
    }

    match FrontendAssets::get(INDEX) {
        Some(index) => Ok(asset_response(INDEX, index.data.into_owned())),
        None => Ok(HttpResponse::ServiceUnavailable()
            .content_type("text/html; charset=utf-8")
            .body(MISSING_BUNDLE)),
    }
}

/// 放在所有 API 路由之后
pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::get().to(serve_frontend));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            CachePolicy::for_path("assets/index-3fA9c1Qe.js"),
            CachePolicy::Immutable
        );
        assert_eq!(
            CachePolicy::for_path("assets/report-card-B7x_k2Lm.css"),
            CachePolicy::Immutable
        );
        // 不带哈希的 assets 文件不能长期缓存
        assert_eq!(CachePolicy::for_path("assets/config.js"), CachePolicy::Revalidate);
        assert_eq!(CachePolicy::for_path("index.html"), CachePolicy::Revalidate);
        assert_eq!(CachePolicy::for_path("sw.js"), CachePolicy::Revalidate);
        assert_eq!(
            CachePolicy::for_path("manifest.webmanifest"),
            CachePolicy::Revalidate
        );
        assert_eq!(CachePolicy::for_path("school-logo.png"), CachePolicy::Daily);
        assert_eq!(CachePolicy::for_path("favicon.ico"), CachePolicy::Daily);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(
            content_type("assets/index-3fA9c1Qe.js"),
            "text/javascript; charset=utf-8"
        );
        assert_eq!(
            content_type("templates/students.csv"),
            "text/csv; charset=utf-8"
        );
        assert_eq!(content_type("LICENSE"), "application/octet-stream");
    }

    async fn get(tail: &str) -> HttpResponse {
        let req = TestRequest::default()
            .param("tail", tail.to_string())
            .to_http_request();
        serve_frontend(req).await.unwrap()
    }

    #[actix_web::test]
    async fn test_unknown_api_path_gets_json_not_found() {
        let resp = get("api/v1/nothing-here").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[actix_web::test]
    async fn test_missing_file_is_not_routed_to_index() {
        let resp = get("assets/missing-0000abcd.js").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_client_route_serves_index() {
        let resp = get("classes/7/report").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
    }
}
