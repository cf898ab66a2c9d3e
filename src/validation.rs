//! Form Validation

/// Login form fields validated on blur and on submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

pub fn validate_login_field(field: LoginField, value: &str) -> Option<&'static str> {
    let value = value.trim();
    match field {
        LoginField::Username if value.is_empty() => Some("请输入用户名"),
        LoginField::Username if value.chars().count() < 2 => Some("用户名不能少于2位"),
        LoginField::Password if value.is_empty() => Some("请输入密码"),
        _ => None,
    }
}

/// Errors for both fields, `(username, password)`
pub fn validate_login(username: &str, password: &str) -> (Option<&'static str>, Option<&'static str>) {
    (
        validate_login_field(LoginField::Username, username),
        validate_login_field(LoginField::Password, password),
    )
}

/// Trimmed value, or `None` when blank
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rules() {
        assert_eq!(validate_login("", ""), (Some("请输入用户名"), Some("请输入密码")));
        assert_eq!(validate_login(" a ", "x"), (Some("用户名不能少于2位"), None));
        assert_eq!(validate_login("王五", "pw"), (None, None));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" a ").as_deref(), Some("a"));
    }
}
