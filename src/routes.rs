/*
 * Responsibility
 * - Static route registration table: declared path template -> visibility
 * - Consulted by the auth middleware (public bypass) and the metrics
 *   middleware (bounded label values)
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteVisibility {
    Public,
    Protected,
}

/// Every route the gateway serves, with its declared template. Built once at
/// startup; unknown paths fail closed (Protected) and are bucketed as `/*`
/// in metric labels so dynamic segments cannot explode label cardinality.
const ROUTES: &[(&str, RouteVisibility)] = &[
    ("/api/profile", RouteVisibility::Protected),
    ("/api/message", RouteVisibility::Protected),
    ("/api/user-location-updates", RouteVisibility::Protected),
    ("/api/users", RouteVisibility::Protected),
    ("/api/users/{id}", RouteVisibility::Protected),
    ("/health/live", RouteVisibility::Public),
    ("/health/ready", RouteVisibility::Public),
    ("/monitoring/metrics", RouteVisibility::Public),
    ("/monitoring/stats", RouteVisibility::Public),
];

/// Label value for any path that matches no registered route.
pub const UNMATCHED_ROUTE: &str = "/*";

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTable;

impl RouteTable {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a raw request path to its registered entry.
    fn lookup(&self, path: &str) -> Option<&'static (&'static str, RouteVisibility)> {
        ROUTES
            .iter()
            .find(|(template, _)| template_matches(template, path))
    }

    pub fn visibility(&self, path: &str) -> RouteVisibility {
        self.lookup(path)
            .map(|(_, visibility)| *visibility)
            .unwrap_or(RouteVisibility::Protected)
    }

    /// Declared template for metric labels, never the raw URL.
    pub fn template(&self, path: &str) -> &'static str {
        self.lookup(path)
            .map(|(template, _)| *template)
            .unwrap_or(UNMATCHED_ROUTE)
    }
}

/// Segment-wise match; `{param}` segments match any single non-empty segment.
fn template_matches(template: &str, path: &str) -> bool {
    let mut template_segments = template.trim_end_matches('/').split('/');
    let mut path_segments = path.trim_end_matches('/').split('/');

    loop {
        match (template_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(t), Some(p)) => {
                let is_param = t.starts_with('{') && t.ends_with('}');
                if is_param {
                    if p.is_empty() {
                        return false;
                    }
                } else if t != p {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_and_monitoring_are_public() {
        let table = RouteTable::new();
        for path in [
            "/health/live",
            "/health/ready",
            "/monitoring/metrics",
            "/monitoring/stats",
        ] {
            assert_eq!(table.visibility(path), RouteVisibility::Public, "{path}");
        }
    }

    #[test]
    fn api_routes_are_protected() {
        let table = RouteTable::new();
        for path in ["/api/profile", "/api/message", "/api/user-location-updates"] {
            assert_eq!(table.visibility(path), RouteVisibility::Protected, "{path}");
        }
    }

    #[test]
    fn unknown_paths_fail_closed() {
        let table = RouteTable::new();
        assert_eq!(table.visibility("/nope"), RouteVisibility::Protected);
        assert_eq!(table.template("/nope"), UNMATCHED_ROUTE);
    }

    #[test]
    fn dynamic_segments_resolve_to_the_declared_template() {
        let table = RouteTable::new();
        assert_eq!(
            table.template("/api/users/0c7f9a52-8f2e-4f9b-9c37-1a2b3c4d5e6f"),
            "/api/users/{id}"
        );
        // A nested path under /api/users does not match the one-param template.
        assert_eq!(table.template("/api/users/x/y"), UNMATCHED_ROUTE);
    }
}
