//! Library path to local path translation.

use crate::settings::PathMapping;

/// Rewrites paths reported by Sonarr/Radarr into paths this process can open.
///
/// Mappings are tried in configured order; the first whose `host_path` is a
/// plain string prefix of the input wins.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    mappings: &'a [PathMapping],
}

impl<'a> PathResolver<'a> {
    pub fn new(mappings: &'a [PathMapping]) -> Self {
        Self { mappings }
    }

    /// Translate `reported`, or return it unchanged when nothing matches.
    pub fn translate(&self, reported: &str) -> String {
        self.try_translate(reported)
            .unwrap_or_else(|| reported.to_string())
    }

    /// Translate `reported`, returning `None` when no mapping applies.
    pub fn try_translate(&self, reported: &str) -> Option<String> {
        self.mappings
            .iter()
            .filter(|m| !m.host_path.is_empty() && !m.container_path.is_empty())
            .find_map(|m| {
                reported
                    .strip_prefix(m.host_path.as_str())
                    .map(|suffix| format!("{}{}", m.container_path, suffix))
            })
    }
}
