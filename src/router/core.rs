use crate::spec::OperationContract;
use regex::Regex;
use tracing::{debug, warn};

/// Compiled path template for one documented operation.
#[derive(Debug, Clone)]
struct TemplateRoute {
    method: String,
    template: String,
    regex: Regex,
    /// Number of literal (non-parameter) segments, used to prefer
    /// `/widgets/mine` over `/widgets/{id}`
    literal_segments: usize,
    index: usize,
}

/// Maps a path (concrete or templated) and method onto an operation index.
///
/// Lookup order: the exact template string, then regex matching against
/// every template, then the same two steps again with each server base
/// path stripped from the front of the path.
#[derive(Debug, Clone, Default)]
pub struct TemplateRouter {
    routes: Vec<TemplateRoute>,
    base_paths: Vec<String>,
}

impl TemplateRouter {
    pub fn new(operations: &[OperationContract], base_paths: &[String]) -> Self {
        let routes: Vec<TemplateRoute> = operations
            .iter()
            .enumerate()
            .filter_map(|(index, op)| match Self::path_to_regex(&op.path_template) {
                Ok(regex) => Some(TemplateRoute {
                    method: op.method.clone(),
                    template: op.path_template.clone(),
                    regex,
                    literal_segments: op
                        .path_template
                        .split('/')
                        .filter(|s| !s.is_empty() && !s.contains('{'))
                        .count(),
                    index,
                }),
                Err(e) => {
                    warn!(template = %op.path_template, error = %e, "Skipping unmatchable path template");
                    None
                }
            })
            .collect();

        debug!(
            routes_count = routes.len(),
            base_paths = ?base_paths,
            "Template routing table built"
        );

        Self {
            routes,
            base_paths: base_paths.to_vec(),
        }
    }

    /// Resolve `path` for `method` to the index of the matching operation.
    pub fn resolve(&self, method: &str, path: &str) -> Option<usize> {
        let path = strip_query(path);
        self.resolve_path(method, path).or_else(|| {
            self.base_paths.iter().find_map(|base| {
                path.strip_prefix(base.as_str())
                    .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                    .and_then(|rest| self.resolve_path(method, if rest.is_empty() { "/" } else { rest }))
            })
        })
    }

    fn resolve_path(&self, method: &str, path: &str) -> Option<usize> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        let for_method = || {
            self.routes
                .iter()
                .filter(move |r| r.method.eq_ignore_ascii_case(method))
        };

        if let Some(route) = for_method().find(|r| r.template == path || r.template == trimmed) {
            return Some(route.index);
        }

        for_method()
            .filter(|r| r.regex.is_match(trimmed))
            .max_by_key(|r| (r.literal_segments, std::cmp::Reverse(r.index)))
            .map(|r| r.index)
    }

    /// Compile `/widgets/{id}` into `^/widgets/[^/]+$`.
    ///
    /// Parameters may share a segment with literals (`/files/{name}.json`).
    pub(crate) fn path_to_regex(template: &str) -> Result<Regex, regex::Error> {
        let template = match template.trim_end_matches('/') {
            "" => "/",
            t => t,
        };
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');

        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            pattern.push_str(&regex::escape(&rest[..open]));
            pattern.push_str("[^/]+");
            rest = &rest[open + close + 1..];
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        Regex::new(&pattern)
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
