//! # Alias Path Resolver
//!
//! Resolves an [`Alias`] against a live resource document into the
//! concrete property paths it denotes for one API version.
//!
//! ## Algorithm
//!
//! 1. **Candidate selection.** Every declared path listing the requested
//!    API version, in declaration order. When none does, the declared path
//!    equal to `default_path`. An alias with no declared paths resolves
//!    `default_path` itself with the alias defaults.
//! 2. **Walk.** Each candidate's steps are followed through the document.
//!    `[*]` fans out over every array element (index order) or object key
//!    (map order); a missing key, out-of-range index, or container of the
//!    wrong kind ends that branch silently.
//! 3. **Rewrite.** Segments produced by a wildcard are passed through the
//!    effective pattern. The replacement is the scalar at key `variable` of
//!    the expanded element; a `Full` pattern without a variable substitutes
//!    its phrase. Segments without a binding stay as they are.
//! 4. **Render.** An array segment is always written `[text]`, even when
//!    the pattern dropped the brackets. Expanded text is passed through
//!    [`escape_segment`], so a key or value containing `/`, `[` or `]`
//!    still tokenizes as one segment and maps back to its alias.
//! 5. **Collect.** Results keep traversal order; a path string already
//!    produced is skipped and does not count toward the result limit.
//!
//! Resolution never fails: a document that lacks the aliased property
//! yields an empty result.

use std::collections::HashSet;

use arm_core::path::{escape_segment, render, Separator};
use arm_core::{Alias, Metadata, Pattern, PathStep, PatternType, PropertyPath, ResolvedPath};
use serde_json::Value;

use crate::config::{EngineConfig, DEFAULT_MAX_RESOLVED_PATHS};
use crate::pattern::CompiledPattern;

/// A resolved path paired with the document value found there.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue<'v> {
    /// The concrete path.
    pub path: ResolvedPath,
    /// The value at that path.
    pub value: &'v Value,
}

/// A declared path chosen for resolution, with its effective overrides.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    path: &'a str,
    pattern: Option<&'a Pattern>,
    metadata: Option<&'a Metadata>,
}

/// Choose the declared paths that apply to `api_version`.
fn select_candidates<'a>(alias: &'a Alias, api_version: &str) -> Vec<Candidate<'a>> {
    if alias.paths.is_empty() {
        if alias.default_path.is_empty() {
            return Vec::new();
        }
        return vec![Candidate {
            path: &alias.default_path,
            pattern: alias.default_pattern.as_ref(),
            metadata: alias.default_metadata.as_ref(),
        }];
    }

    let to_candidate = move |i: usize| Candidate {
        path: &alias.paths[i].path,
        pattern: alias.effective_pattern(&alias.paths[i]),
        metadata: alias.effective_metadata(&alias.paths[i]),
    };

    let listed: Vec<Candidate<'a>> = (0..alias.paths.len())
        .filter(|&i| alias.paths[i].supports(api_version))
        .map(to_candidate)
        .collect();
    if !listed.is_empty() {
        return listed;
    }

    alias
        .paths
        .iter()
        .position(|p| p.path == alias.default_path)
        .map(to_candidate)
        .into_iter()
        .collect()
}

/// Resolves aliases against resource documents.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    max_resolved_paths: usize,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self {
            max_resolved_paths: DEFAULT_MAX_RESOLVED_PATHS,
        }
    }
}

impl AliasResolver {
    /// A resolver honoring `config.max_resolved_paths`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_resolved_paths: config.max_resolved_paths,
        }
    }

    /// The cap on paths returned per alias.
    pub fn max_resolved_paths(&self) -> usize {
        self.max_resolved_paths
    }

    /// Resolve `alias` for `api_version` against `body`.
    pub fn resolve(&self, alias: &Alias, api_version: &str, body: &Value) -> Vec<ResolvedPath> {
        self.evaluate(alias, api_version, body)
            .into_iter()
            .map(|hit| hit.path)
            .collect()
    }

    /// Resolve and return the value at each resolved path.
    pub fn evaluate<'v>(
        &self,
        alias: &Alias,
        api_version: &str,
        body: &'v Value,
    ) -> Vec<ResolvedValue<'v>> {
        let candidates = select_candidates(alias, api_version);
        tracing::debug!(
            alias = %alias.name,
            api_version,
            candidates = candidates.len(),
            "resolving alias"
        );

        let mut walk = Walk::new(self.max_resolved_paths);
        for (index, candidate) in candidates.iter().enumerate() {
            let template = match PropertyPath::parse(candidate.path) {
                Ok(template) => template,
                Err(e) => {
                    tracing::warn!(alias = %alias.name, path = candidate.path, "skipping malformed path: {e}");
                    continue;
                }
            };
            let pattern = match candidate.pattern.map(CompiledPattern::compile).transpose() {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!(alias = %alias.name, path = candidate.path, "ignoring invalid pattern: {e}");
                    None
                }
            };

            walk.descend(body, template.steps(), pattern.as_ref(), index);
            if walk.truncated {
                break;
            }
        }
        let truncated = walk.truncated;

        let resolved: Vec<ResolvedValue<'v>> = walk
            .hits
            .into_iter()
            .map(|(path, value, index)| ResolvedValue {
                path: ResolvedPath {
                    resource_type_path: path,
                    api_version: api_version.to_string(),
                    metadata: candidates[index].metadata.cloned(),
                },
                value,
            })
            .collect();

        if truncated {
            tracing::warn!(
                alias = %alias.name,
                limit = self.max_resolved_paths,
                "alias resolution truncated"
            );
        }
        resolved
    }
}

/// Resolve with the default resolver.
pub fn resolve(alias: &Alias, api_version: &str, body: &Value) -> Vec<ResolvedPath> {
    AliasResolver::default().resolve(alias, api_version, body)
}

/// Depth-first traversal state shared by every candidate of one alias.
///
/// Paths are deduplicated as they are produced, so the limit counts
/// distinct paths only.
struct Walk<'v> {
    trail: Vec<(Separator, String)>,
    seen: HashSet<String>,
    /// `(path, value, candidate index)` in traversal order.
    hits: Vec<(String, &'v Value, usize)>,
    limit: usize,
    truncated: bool,
}

impl<'v> Walk<'v> {
    fn new(limit: usize) -> Self {
        Self {
            trail: Vec::new(),
            seen: HashSet::new(),
            hits: Vec::new(),
            limit,
            truncated: false,
        }
    }

    fn descend(
        &mut self,
        node: &'v Value,
        steps: &[PathStep],
        pattern: Option<&CompiledPattern>,
        candidate: usize,
    ) {
        if self.truncated {
            return;
        }
        let Some((step, rest)) = steps.split_first() else {
            let path = render(self.trail.iter().map(|(sep, text)| (*sep, text.as_str())));
            if self.seen.contains(&path) {
                return;
            }
            if self.hits.len() >= self.limit {
                self.truncated = true;
                return;
            }
            self.seen.insert(path.clone());
            self.hits.push((path, node, candidate));
            return;
        };

        match step {
            PathStep::Key(key) => {
                if let Some(child) = node.as_object().and_then(|map| map.get(key)) {
                    self.enter(Separator::Slash, key.clone(), child, rest, pattern, candidate);
                }
            }
            PathStep::Index(index) => {
                if let Some(child) = node.as_array().and_then(|items| items.get(*index)) {
                    self.enter(Separator::Attached, format!("[{index}]"), child, rest, pattern, candidate);
                }
            }
            PathStep::Wildcard => match node {
                Value::Array(items) => {
                    for (index, child) in items.iter().enumerate() {
                        let rewritten = rewrite(pattern, format!("[{index}]"), child);
                        let segment = bracketed(&rewritten);
                        self.enter(Separator::Attached, segment, child, rest, pattern, candidate);
                    }
                }
                Value::Object(map) => {
                    for (key, child) in map {
                        let rewritten = rewrite(pattern, key.clone(), child);
                        let segment = escape_segment(&rewritten).into_owned();
                        self.enter(Separator::Slash, segment, child, rest, pattern, candidate);
                    }
                }
                _ => {}
            },
        }
    }

    fn enter(
        &mut self,
        separator: Separator,
        segment: String,
        child: &'v Value,
        rest: &[PathStep],
        pattern: Option<&CompiledPattern>,
        candidate: usize,
    ) {
        self.trail.push((separator, segment));
        self.descend(child, rest, pattern, candidate);
        self.trail.pop();
    }
}

/// Apply the effective pattern to a wildcard-expanded segment.
fn rewrite(pattern: Option<&CompiledPattern>, segment: String, element: &Value) -> String {
    let Some(pattern) = pattern else {
        return segment;
    };
    let Some(matched) = pattern.match_segment(&segment) else {
        return segment;
    };
    match binding(pattern, element) {
        Some(replacement) => pattern.substitute(&matched, &replacement),
        None => segment,
    }
}

/// Render an array segment as `[text]`, whatever the pattern produced.
///
/// A rewrite that kept its brackets has only its inner text escaped; any
/// other text is escaped whole and wrapped.
fn bracketed(rewritten: &str) -> String {
    let inner = rewritten
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(rewritten);
    format!("[{}]", escape_segment(inner))
}

/// The replacement text a pattern binds for an expanded element.
fn binding(pattern: &CompiledPattern, element: &Value) -> Option<String> {
    if pattern.variable().is_empty() {
        return (pattern.kind() == PatternType::Full).then(|| pattern.phrase().to_string());
    }
    match element.get(pattern.variable())? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
