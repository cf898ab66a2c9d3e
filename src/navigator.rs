//! Page Navigation
//!
//! Each role has its own HTML entry page; moving between them is a full
//! page load.

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Teacher,
    Researcher,
    Operator,
}

impl Route {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Teacher => Route::Teacher,
            Role::Researcher => Route::Researcher,
            Role::Operator => Route::Operator,
            Role::Unknown => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "index.html",
            Route::Teacher => "teacher.html",
            Route::Researcher => "researcher.html",
            Route::Operator => "operator.html",
        }
    }

    /// Match on the last path segment; anything unknown is the login page
    pub fn from_path(pathname: &str) -> Self {
        let page = pathname
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        match page {
            "teacher.html" | "teacher" => Route::Teacher,
            "researcher.html" | "researcher" => Route::Researcher,
            "operator.html" | "operator" => Route::Operator,
            _ => Route::Login,
        }
    }
}

pub trait Navigator {
    fn redirect(&self, path: &str);

    fn go(&self, route: Route) {
        self.redirect(route.path());
    }
}

/// Sets `window.location.href`
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, path: &str) {
        log::info!("[NAV] -> {}", path);
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(path) {
                log::error!("[NAV] redirect to {} failed: {:?}", path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_routes() {
        assert_eq!(Route::for_role(Role::Teacher).path(), "teacher.html");
        assert_eq!(Route::for_role(Role::Researcher).path(), "researcher.html");
        assert_eq!(Route::for_role(Role::Operator).path(), "operator.html");
        assert_eq!(Route::for_role(Role::Unknown).path(), "index.html");
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/app/operator.html"), Route::Operator);
        assert_eq!(Route::from_path("/teacher/"), Route::Teacher);
        assert_eq!(Route::from_path("/"), Route::Login);
        assert_eq!(Route::from_path("/index.html"), Route::Login);
    }
}
