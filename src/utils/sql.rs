/// 转义 LIKE 模式中的通配符（`%`、`_` 与转义符本身）
///
/// 结果需要配合 `ESCAPE '\'` 使用。
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 构造包含匹配模式，配合 `LikeExpr::escape('\\')` 使用
pub fn contains_pattern(search: &str) -> String {
    format!("%{}%", escape_like_pattern(search.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_wildcards() {
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_pattern(r"a\b"), r"a\\b");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn test_contains_pattern_trims() {
        assert_eq!(contains_pattern("  Ana_B "), "%Ana\\_B%");
    }
}
