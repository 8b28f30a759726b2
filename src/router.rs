//! Route table and the global pre-navigation guard.
//!
//! DESIGN
//! ======
//! Routes are matched top to bottom, first match wins, and a match yields
//! the chain of records from the outermost ancestor down to the leaf. The
//! guard inspects that whole chain, so flagging a parent protects all of
//! its children.

use std::fmt;

use crate::session::SessionStore;

pub const LOGIN_ROUTE: &str = "login";
pub const LOGIN_PATH: &str = "/login";
pub const REDIRECT_QUERY: &str = "redirect";

// =============================================================================
// PATTERNS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// `:name(.*)*` matches zero or more segments; `:name(.*)` one or more.
    CatchAll { name: String, allow_empty: bool },
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let Some(param) = raw.strip_prefix(':') else {
                return Segment::Static(raw.to_owned());
            };
            if let Some(name) = param.strip_suffix("(.*)*") {
                Segment::CatchAll { name: name.to_owned(), allow_empty: true }
            } else if let Some(name) = param.strip_suffix("(.*)") {
                Segment::CatchAll { name: name.to_owned(), allow_empty: false }
            } else {
                Segment::Param(param.to_owned())
            }
        })
        .collect()
}

/// Match `segments` as a prefix of `path`; returns how many path segments
/// were consumed and the captured params.
fn match_prefix(segments: &[Segment], path: &[&str]) -> Option<(usize, Vec<(String, String)>)> {
    let mut params = Vec::new();
    let mut consumed = 0;
    for segment in segments {
        match segment {
            Segment::Static(s) => {
                if path.get(consumed) != Some(&s.as_str()) {
                    return None;
                }
                consumed += 1;
            }
            Segment::Param(name) => {
                let value = path.get(consumed)?;
                params.push((name.clone(), (*value).to_owned()));
                consumed += 1;
            }
            Segment::CatchAll { name, allow_empty } => {
                let rest = &path[consumed..];
                if rest.is_empty() && !allow_empty {
                    return None;
                }
                params.push((name.clone(), rest.join("/")));
                consumed = path.len();
            }
        }
    }
    Some((consumed, params))
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub name: String,
    pub path: String,
    pub auth_required: bool,
    pub children: Vec<RouteRecord>,
    segments: Vec<Segment>,
}

impl RouteRecord {
    #[must_use]
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_owned(),
            path: path.to_owned(),
            auth_required: false,
            children: Vec::new(),
            segments: parse_pattern(path),
        }
    }

    #[must_use]
    pub fn auth_required(mut self) -> Self {
        self.auth_required = true;
        self
    }

    /// Nested route; its path is relative to this record's.
    #[must_use]
    pub fn child(mut self, child: RouteRecord) -> Self {
        self.children.push(child);
        self
    }

    fn resolve<'a>(&'a self, path: &[&str], chain: &mut Vec<&'a RouteRecord>, params: &mut Vec<(String, String)>) -> bool {
        let Some((consumed, own)) = match_prefix(&self.segments, path) else {
            return false;
        };
        let rest = &path[consumed..];

        chain.push(self);
        let before = params.len();
        params.extend(own);

        if rest.is_empty() {
            return true;
        }
        if self
            .children
            .iter()
            .any(|child| child.resolve(rest, chain, params))
        {
            return true;
        }

        chain.pop();
        params.truncate(before);
        false
    }
}

/// The records a path resolved to, outermost first.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub matched: Vec<&'a RouteRecord>,
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    /// Name of the innermost matched record.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.matched.last().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.matched.iter().any(|r| r.auth_required)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self { routes }
    }

    /// Resolve a path to its matched record chain.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut chain = Vec::new();
        let mut params = Vec::new();
        let found = self
            .routes
            .iter()
            .any(|route| route.resolve(&segments, &mut chain, &mut params));
        found.then_some(RouteMatch { matched: chain, params })
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RouteRecord> {
        fn walk<'a>(routes: &'a [RouteRecord], name: &str) -> Option<&'a RouteRecord> {
            routes
                .iter()
                .find_map(|r| if r.name == name { Some(r) } else { walk(&r.children, name) })
        }
        walk(&self.routes, name)
    }
}

impl Default for RouteTable {
    /// Login is public; everything else, unknown paths included, needs a session.
    fn default() -> Self {
        Self::new(vec![
            RouteRecord::new(LOGIN_ROUTE, LOGIN_PATH),
            RouteRecord::new("clients", "/clients").auth_required(),
            RouteRecord::new("not-found", "/:pathMatch(.*)*").auth_required(),
            RouteRecord::new("bad-not-found", "/:pathMatch(.*)").auth_required(),
        ])
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// A navigation target: path plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// Parse `/path?k=v&...`; query values are percent-decoded.
    #[must_use]
    pub fn parse(href: &str) -> Self {
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(k), decode(v))
            })
            .collect();
        Self { path: path.to_owned(), query }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path with the query string, as the user navigated to it.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", encode_query(k, false), encode_query(v, true))?;
        }
        Ok(())
    }
}

/// Percent-encode only what would break a query pair apart. `/`, `?` and
/// `:` stay readable, so a redirect renders as `?redirect=/clients`.
fn encode_query(raw: &str, is_value: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            ' ' => out.push('+'),
            '=' if is_value => out.push('='),
            'a'..='z'
            | 'A'..='Z'
            | '0'..='9'
            | '-'
            | '.'
            | '_'
            | '~'
            | '!'
            | '$'
            | '\''
            | '('
            | ')'
            | '*'
            | ','
            | ';'
            | ':'
            | '@'
            | '/'
            | '?' => out.push(ch),
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
            }
        }
    }
    out
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), std::borrow::Cow::into_owned)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect { name: String, to: Location },
}

impl Navigation {
    /// Where the browser ends up, `None` when navigation proceeds unchanged.
    #[must_use]
    pub fn href(&self) -> Option<String> {
        match self {
            Self::Proceed => None,
            Self::Redirect { to, .. } => Some(to.to_string()),
        }
    }
}

/// Redirects unauthenticated navigation away from protected routes.
#[derive(Debug, Clone)]
pub struct Guard {
    routes: RouteTable,
    session: SessionStore,
}

impl Guard {
    #[must_use]
    pub fn new(routes: RouteTable, session: SessionStore) -> Self {
        Self { routes, session }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether navigation to `to` proceeds or is sent to login.
    #[must_use]
    pub fn before_each(&self, to: &Location) -> Navigation {
        let protected = self
            .routes
            .resolve(&to.path)
            .is_some_and(|m| m.requires_auth());
        if !protected || self.session.is_authenticated() {
            return Navigation::Proceed;
        }

        let original = to.full_path();
        tracing::debug!(to = %original, "navigation requires login");
        let login_path = self
            .routes
            .find(LOGIN_ROUTE)
            .map_or(LOGIN_PATH, |r| r.path.as_str());
        Navigation::Redirect {
            name: LOGIN_ROUTE.to_owned(),
            to: Location { path: login_path.to_owned(), query: vec![(REDIRECT_QUERY.to_owned(), original)] },
        }
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
