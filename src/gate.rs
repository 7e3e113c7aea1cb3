//! Route definitions and the authorization gate.
//!
//! Pure logic with no dependency on the DOM. The browser router and the
//! [`Navigator`](crate::navigator::Navigator) both evaluate every navigation
//! through [`evaluate`].

use std::fmt::{self, Display};

use devboard_shared::DeviceId;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
const DEVICE_PREFIX: &str = "/device/";

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// Device list and pending notifications (requires authentication)
    #[default]
    Home,
    Login,
    /// `/device/:id` (requires authentication)
    Device { id: DeviceId },
    /// Any unmatched path
    NotFound { path: String },
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// Query string and fragment are ignored, as is a trailing slash. The
    /// device id segment is percent-decoded.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.trim_end_matches('/') {
            "" => HOME_PATH,
            p => p,
        };

        match trimmed {
            HOME_PATH => Self::Home,
            LOGIN_PATH => Self::Login,
            p => match p.strip_prefix(DEVICE_PREFIX) {
                Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                    match DeviceId::from_path_segment(segment) {
                        Some(id) => Self::Device { id },
                        None => Self::NotFound {
                            path: path.to_string(),
                        },
                    }
                }
                _ => Self::NotFound {
                    path: path.to_string(),
                },
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::Device { id } => format!("{}{}", DEVICE_PREFIX, id.path_segment()),
            Self::NotFound { path } => path.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Device { .. } => "Device",
            Self::NotFound { .. } => "NotFound",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Home | Self::Device { .. })
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// Gate
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(AppRoute),
}

/// Decides one navigation attempt.
///
/// `from` is `None` on the initial load. The device-detail rule only looks at
/// where the navigation came from; it does not check that the device exists.
pub fn evaluate(to: &AppRoute, from: Option<&AppRoute>, authenticated: bool) -> GateDecision {
    if to.requires_auth() && !authenticated {
        return GateDecision::Redirect(AppRoute::auth_failure_redirect());
    }
    if to.should_redirect_when_authenticated() && authenticated {
        return GateDecision::Redirect(AppRoute::auth_success_redirect());
    }
    if matches!(to, AppRoute::Device { .. }) && from != Some(&AppRoute::Home) {
        return GateDecision::Redirect(AppRoute::Home);
    }
    GateDecision::Allow
}
