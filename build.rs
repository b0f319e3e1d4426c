//! 前端未构建时写入一个占位首页，rust-embed 需要 frontend/dist 目录存在

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

const PLACEHOLDER_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>School System</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; color: #1f2937; }
    dl { display: grid; grid-template-columns: max-content 1fr; gap: .4rem 1rem; }
    dt { font-weight: 600; }
    code { background: #eef2f7; padding: 0 .3rem; border-radius: 3px; }
  </style>
</head>
<body>
  <h1>School System</h1>
  <p>The server is running without the web dashboard. The REST API is fully available.</p>
  <dl>
    <dt>API base</dt><dd><code>/api/v1</code></dd>
    <dt>Sign in</dt><dd><code>POST /api/v1/auth/login</code></dd>
    <dt>Dashboard</dt><dd><code>GET /api/v1/dashboard/stats</code></dd>
  </dl>
  <p>To embed the dashboard, run <code>npm ci &amp;&amp; npm run build</code> in <code>frontend/</code> and rebuild the server.</p>
</body>
</html>
"#;

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=frontend/dist/index.html");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(io::Error::other)?;
    let dist = PathBuf::from(manifest_dir).join("frontend").join("dist");
    let index = dist.join("index.html");
    if index.exists() {
        return Ok(());
    }

    println!("cargo:warning=frontend/dist/index.html is missing, embedding the placeholder page");
    fs::create_dir_all(&dist)?;
    fs::write(index, PLACEHOLDER_INDEX)
}
