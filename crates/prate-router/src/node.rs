//! Radix tree node.
//!
//! Each node owns one path segment. Children are split by kind so matching can
//! try them in priority order: static, then parameter, then catch-all.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Kind of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment such as `users`.
    Static,
    /// Named parameter, written `:id` or `{id}`.
    Param(String),
    /// Catch-all, written `*path`. Only valid as the last segment.
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Segment text as it appeared in the pattern.
    pub segment: String,

    /// Segment kind.
    pub kind: SegmentKind,

    /// Values registered at this node, if it terminates a route.
    pub methods: Option<MethodRouter<T>>,

    /// Static children, kept sorted for binary search.
    pub static_children: Vec<Node<T>>,

    /// At most one parameter child.
    pub param_child: Option<Box<Node<T>>>,

    /// At most one catch-all child.
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind("", SegmentKind::Static)
    }

    /// Registers `value` for `method` at `path`.
    pub fn insert(&mut self, method: Method, path: &str, value: T) -> Result<(), RouteError> {
        let segments = parse_path(path)?;
        if let Some(pos) = segments
            .iter()
            .position(|(_, kind)| matches!(kind, SegmentKind::Wildcard(_)))
        {
            if pos + 1 != segments.len() {
                return Err(RouteError::WildcardNotLast {
                    path: path.to_string(),
                });
            }
        }
        self.insert_segments(&segments, method, path, value)
    }

    fn insert_segments(
        &mut self,
        segments: &[(String, SegmentKind)],
        method: Method,
        path: &str,
        value: T,
    ) -> Result<(), RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self
                .methods
                .get_or_insert_with(MethodRouter::new)
                .insert(method.clone(), value)
                .map_err(|_| RouteError::Duplicate {
                    method,
                    path: path.to_string(),
                });
        };

        let child = match kind {
            SegmentKind::Static => {
                match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(i) => &mut self.static_children[i],
                    Err(i) => {
                        self.static_children
                            .insert(i, Node::with_kind(segment.as_str(), SegmentKind::Static));
                        &mut self.static_children[i]
                    }
                }
            }
            SegmentKind::Param(name) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::with_kind(segment.as_str(), kind.clone())));
                if let SegmentKind::Param(existing) = &child.kind {
                    if existing != name {
                        return Err(RouteError::ConflictingParam {
                            existing: existing.clone(),
                            new: name.clone(),
                            path: path.to_string(),
                        });
                    }
                }
                child.as_mut()
            }
            SegmentKind::Wildcard(name) => {
                let child = self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Node::with_kind(segment.as_str(), kind.clone())));
                if let SegmentKind::Wildcard(existing) = &child.kind {
                    if existing != name {
                        return Err(RouteError::ConflictingParam {
                            existing: existing.clone(),
                            new: name.clone(),
                            path: path.to_string(),
                        });
                    }
                }
                child.as_mut()
            }
        };
        child.insert_segments(remaining, method, path, value)
    }

    /// Finds the method table registered for `path`, collecting parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let (SegmentKind::Wildcard(name), Some(methods)) = (&child.kind, &child.methods) {
                params.push(name.clone(), segments.join("/"));
                return Some(methods);
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }

    /// Visits every method table in the subtree.
    pub fn for_each_route<'a>(&'a self, f: &mut dyn FnMut(&'a MethodRouter<T>)) {
        if let Some(methods) = &self.methods {
            f(methods);
        }
        for child in &self.static_children {
            child.for_each_route(f);
        }
        if let Some(child) = &self.param_child {
            child.for_each_route(f);
        }
        if let Some(child) = &self.wildcard_child {
            child.for_each_route(f);
        }
    }
}

/// Splits a pattern into typed segments.
fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let kind = if let Some(name) = s.strip_prefix(':') {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                SegmentKind::Wildcard(name.to_string())
            } else {
                return Ok((s.to_string(), SegmentKind::Static));
            };
            match &kind {
                SegmentKind::Param(name) | SegmentKind::Wildcard(name) if name.is_empty() => {
                    Err(RouteError::UnnamedParam {
                        path: path.to_string(),
                    })
                }
                _ => Ok((s.to_string(), kind)),
            }
        })
        .collect()
}
