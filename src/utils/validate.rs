use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static ENROLLMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("Invalid enrollment number regex"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Invalid URL regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 可选：特殊字符（增强安全性）
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    // 1. 长度检查：至少 8 个字符
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    // 2. 大写字母检查
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    // 3. 小写字母检查
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    // 4. 数字检查
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    // 5. 常见弱密码检查
    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

/// 通用文本长度校验（按字符计数，首尾空白不计）
pub fn validate_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        if min == 0 {
            return Err(format!("{field} must be at most {max} characters"));
        }
        return Err(format!("{field} length must be between {min} and {max} characters"));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<(), String> {
    validate_text("Full name", full_name, 1, 100)
}

pub fn validate_class_year(year: i32) -> Result<(), &'static str> {
    if !(2000..=2100).contains(&year) {
        return Err("Class year must be between 2000 and 2100");
    }
    Ok(())
}

pub fn validate_enrollment_number(number: &str) -> Result<(), &'static str> {
    if number.is_empty() || number.len() > 32 {
        return Err("Enrollment number length must be between 1 and 32 characters");
    }
    if !ENROLLMENT_RE.is_match(number) {
        return Err("Enrollment number must contain only letters, numbers or hyphens");
    }
    Ok(())
}

pub fn validate_workload_hours(hours: i32) -> Result<(), &'static str> {
    if !(1..=2000).contains(&hours) {
        return Err("Workload hours must be between 1 and 2000");
    }
    Ok(())
}

pub fn validate_bimester(bimester: i32) -> Result<(), &'static str> {
    if !(1..=4).contains(&bimester) {
        return Err("Bimester must be between 1 and 4");
    }
    Ok(())
}

pub fn validate_max_score(max_score: f64) -> Result<(), &'static str> {
    if !max_score.is_finite() || max_score <= 0.0 || max_score > 1000.0 {
        return Err("Max score must be greater than 0 and at most 1000");
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<(), &'static str> {
    if !weight.is_finite() || weight <= 0.0 || weight > 100.0 {
        return Err("Weight must be greater than 0 and at most 100");
    }
    Ok(())
}

/// 分数必须落在 0..=max_score
pub fn validate_score(score: f64, max_score: f64) -> Result<(), String> {
    if !score.is_finite() || score < 0.0 || score > max_score {
        return Err(format!("Score must be between 0 and {max_score}"));
    }
    Ok(())
}

pub fn validate_day_of_week(day: i32) -> Result<(), &'static str> {
    if !(1..=7).contains(&day) {
        return Err("Day of week must be between 1 (Monday) and 7 (Sunday)");
    }
    Ok(())
}

pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), &'static str> {
    if start >= end {
        return Err("Start time must be before end time");
    }
    Ok(())
}

pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err("Start date must not be after end date");
    }
    Ok(())
}

pub fn validate_http_url(url: &str) -> Result<(), &'static str> {
    if url.len() > 2048 || !URL_RE.is_match(url) {
        return Err("Attachment URL must be a valid http or https URL");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_no_uppercase() {
        let result = validate_password("abcd1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn test_no_lowercase() {
        let result = validate_password("ABCD1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one lowercase letter")
        );
    }

    #[test]
    fn test_no_digit() {
        let result = validate_password("AbcdEfgh");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("seventeen-chars-x").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_text_lengths() {
        assert!(validate_full_name("Ana Souza").is_ok());
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"x".repeat(101)).is_err());
        assert!(validate_text("Description", "", 0, 500).is_ok());
        assert!(validate_text("Description", &"d".repeat(501), 0, 500).is_err());
    }

    #[test]
    fn test_school_ranges() {
        assert!(validate_class_year(2025).is_ok());
        assert!(validate_class_year(1999).is_err());
        assert!(validate_bimester(4).is_ok());
        assert!(validate_bimester(5).is_err());
        assert!(validate_workload_hours(0).is_err());
        assert!(validate_max_score(10.0).is_ok());
        assert!(validate_max_score(0.0).is_err());
        assert!(validate_weight(100.0).is_ok());
        assert!(validate_weight(100.5).is_err());
        assert!(validate_day_of_week(7).is_ok());
        assert!(validate_day_of_week(0).is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(validate_score(0.0, 10.0).is_ok());
        assert!(validate_score(10.0, 10.0).is_ok());
        assert!(validate_score(10.01, 10.0).is_err());
        assert!(validate_score(-1.0, 10.0).is_err());
        assert!(validate_score(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_enrollment_number() {
        assert!(validate_enrollment_number("RA-2025-001").is_ok());
        assert!(validate_enrollment_number("").is_err());
        assert!(validate_enrollment_number("RA 01").is_err());
    }

    #[test]
    fn test_time_and_date_ranges() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert!(validate_time_range(t(7, 0), t(7, 50)).is_ok());
        assert!(validate_time_range(t(8, 0), t(8, 0)).is_err());

        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day);
        assert!(validate_date_range(d(1), d(31)).is_ok());
        assert!(validate_date_range(d(10), d(2)).is_err());
        assert!(validate_date_range(None, d(2)).is_ok());
    }

    #[test]
    fn test_http_url() {
        assert!(validate_http_url("https://files.example.com/report.pdf").is_ok());
        assert!(validate_http_url("ftp://example.com/a").is_err());
        assert!(validate_http_url("javascript:alert(1)").is_err());
    }
}
