//! Page route lookup for the current location path

use serde::Serialize;

/// A route template and the label of the section it names.
///
/// Template segments written as `{name}` match any single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRoute {
    pub template: &'static str,
    pub label: &'static str,
}

impl PageRoute {
    pub const fn new(template: &'static str, label: &'static str) -> Self {
        Self { template, label }
    }

    /// Whether every template segment matches the leading segments of `path`
    pub fn matches(&self, path: &str) -> bool {
        let mut actual = path_segments(path).into_iter();
        path_segments(self.template).into_iter().all(|expected| {
            actual.next().is_some_and(|segment| {
                is_placeholder(expected) || expected == segment
            })
        })
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Non-empty segments of a location path
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

#[derive(Debug, Clone)]
pub struct PageRoutes {
    routes: Vec<PageRoute>,
}

impl PageRoutes {
    pub fn new(routes: Vec<PageRoute>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[PageRoute] {
        &self.routes
    }

    /// Index and route of the last matching entry; later entries are more specific
    pub fn lookup(&self, path: &str) -> Option<(usize, &PageRoute)> {
        self.routes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, route)| route.matches(path))
    }
}

impl Default for PageRoutes {
    fn default() -> Self {
        Self::new(vec![
            PageRoute::new("/", "Portfolio"),
            PageRoute::new("/projects", "Projects"),
            PageRoute::new("/services", "Services"),
            PageRoute::new("/skills", "Skills"),
            PageRoute::new("/skills/{language}", "Language"),
            PageRoute::new("/skills/{language}/{library}", "Library"),
        ])
    }
}
