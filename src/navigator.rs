//! Navigation state: the current route plus gate-checked transitions.
//!
//! 流程：请求 -> 验证(Guard) -> 处理 -> 加载

use crate::gate::{AppRoute, GateDecision, evaluate};

/// Upper bound on chained redirects for one navigation. Every gate rule
/// redirects to Home or Login, and those settle after at most two hops.
const MAX_REDIRECTS: usize = 2;

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: AppRoute,
    pub redirected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Option<AppRoute>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first navigation.
    pub fn current(&self) -> Option<&AppRoute> {
        self.current.as_ref()
    }

    /// Runs the gate for `target`, following redirects.
    ///
    /// Each redirect target is evaluated again with the original origin, the
    /// same way a redirect issued from a navigation guard starts a fresh
    /// navigation.
    pub fn resolve(target: AppRoute, from: Option<&AppRoute>, authenticated: bool) -> Navigation {
        let mut route = target;
        let mut redirected = false;

        for _ in 0..MAX_REDIRECTS {
            match evaluate(&route, from, authenticated) {
                GateDecision::Allow => break,
                GateDecision::Redirect(next) => {
                    log::debug!("[router] {} denied, redirecting to {}", route, next);
                    route = next;
                    redirected = true;
                }
            }
        }

        Navigation { route, redirected }
    }

    pub fn navigate(&mut self, path: &str, authenticated: bool) -> Navigation {
        self.navigate_to(AppRoute::from_path(path), authenticated)
    }

    pub fn navigate_to(&mut self, target: AppRoute, authenticated: bool) -> Navigation {
        let navigation = Self::resolve(target, self.current.as_ref(), authenticated);
        self.current = Some(navigation.route.clone());
        navigation
    }

    /// Re-checks the current route after the session changed.
    ///
    /// Logging out on a protected route moves to login; logging in while on
    /// login moves home. Returns the new navigation if the route changed.
    pub fn reconcile(&mut self, authenticated: bool) -> Option<Navigation> {
        let current = self.current.as_ref()?;

        let target = if authenticated && current.should_redirect_when_authenticated() {
            AppRoute::auth_success_redirect()
        } else if !authenticated && current.requires_auth() {
            AppRoute::auth_failure_redirect()
        } else {
            return None;
        };

        log::debug!(
            "[router] auth state changed ({}), leaving {}",
            if authenticated { "logged in" } else { "logged out" },
            current
        );
        Some(self.navigate_to(target, authenticated))
    }
}
