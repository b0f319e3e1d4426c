use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Admin,   // 管理员
    Coord,   // 教务协调员
    Teacher, // 教师
    Student, // 学生
}

impl UserRole {
    pub const ADMIN: &'static str = "admin";
    pub const COORD: &'static str = "coord";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    /// 管理层：管理员与协调员
    pub fn management_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::Coord]
    }
    /// 教职工：管理层与教师
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::Coord, &Self::Teacher]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::Coord, &Self::Teacher, &Self::Student]
    }

    pub fn is_management(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coord)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => Self::ADMIN,
            UserRole::Coord => Self::COORD,
            UserRole::Teacher => Self::TEACHER,
            UserRole::Student => Self::STUDENT,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid user role: '{s}'. Supported roles: admin, coord, teacher, student"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::COORD => Ok(UserRole::Coord),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::STUDENT => Ok(UserRole::Student),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserStatus {
    Active,    // 活跃
    Inactive,  // 非活跃
    Suspended, // 暂停
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid user status: '{s}'. Supported: active, inactive, suspended"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户实体（profiles）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// 账号被其他表引用的情况，角色变更前检查
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleLinks {
    pub has_student_record: bool,
    pub allocation_count: i64,
    pub coordinated_classes: i64,
}

impl RoleLinks {
    /// 角色由 `current` 改为 `next` 后仍会失效的关联；None 表示可以变更
    pub fn blocking_link(&self, current: UserRole, next: UserRole) -> Option<&'static str> {
        if current == next {
            return None;
        }
        if self.has_student_record && next != UserRole::Student {
            return Some("The user still has a student record");
        }
        if self.allocation_count > 0 && next != UserRole::Teacher {
            return Some("The user still has teaching allocations");
        }
        if self.coordinated_classes > 0 && next != UserRole::Coord {
            return Some("The user still coordinates classes");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in UserRole::all_roles() {
            let parsed: UserRole = role.to_string().parse().unwrap();
            assert_eq!(&parsed, *role);
        }
        assert!("user".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_links_block_conflicting_role_changes() {
        let student = RoleLinks {
            has_student_record: true,
            ..Default::default()
        };
        assert!(student.blocking_link(UserRole::Student, UserRole::Teacher).is_some());
        assert_eq!(student.blocking_link(UserRole::Student, UserRole::Student), None);

        let teacher = RoleLinks {
            allocation_count: 2,
            ..Default::default()
        };
        assert!(teacher.blocking_link(UserRole::Teacher, UserRole::Coord).is_some());
        assert!(teacher.blocking_link(UserRole::Teacher, UserRole::Admin).is_some());

        let coord = RoleLinks {
            coordinated_classes: 1,
            ..Default::default()
        };
        assert!(coord.blocking_link(UserRole::Coord, UserRole::Admin).is_some());

        let unlinked = RoleLinks::default();
        assert_eq!(unlinked.blocking_link(UserRole::Teacher, UserRole::Admin), None);
        assert_eq!(unlinked.blocking_link(UserRole::Student, UserRole::Coord), None);
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::management_roles().contains(&&UserRole::Coord));
        assert!(!UserRole::management_roles().contains(&&UserRole::Teacher));
        assert!(UserRole::staff_roles().contains(&&UserRole::Teacher));
        assert!(!UserRole::staff_roles().contains(&&UserRole::Student));
        assert!(UserRole::Admin.is_management());
        assert!(!UserRole::Student.is_management());
    }

    #[test]
    fn test_deserialize_rejects_unknown_role() {
        let err = serde_json::from_str::<UserRole>("\"principal\"").unwrap_err();
        assert!(err.to_string().contains("Invalid user role"));
        let role: UserRole = serde_json::from_str("\"coord\"").unwrap();
        assert_eq!(role, UserRole::Coord);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = chrono::Utc::now();
        let user = User {
            id: 1,
            username: "admin".into(),
            email: "admin@localhost".into(),
            password_hash: "secret-hash".into(),
            full_name: "Administrator".into(),
            role: UserRole::Admin,
            status: UserStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
