//! Route path patterns such as `/entries/{gid}`.

use std::collections::HashMap;

use keeweb_shared::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, AppError> {
        if pattern.is_empty() {
            return Err(AppError::parameter("route", "No route specified."));
        }
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(AppError::parameter("route", "Must start with '/'."));
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                segments.push(Self::parse_segment(part)?);
            }
        }

        let mut names: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        if names.len() != count {
            return Err(AppError::parameter("route", "Duplicate path parameter."));
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    fn parse_segment(part: &str) -> Result<Segment, AppError> {
        if let Some(inner) = part.strip_prefix('{') {
            let name = inner
                .strip_suffix('}')
                .ok_or_else(|| AppError::parameter("route", format!("Unclosed parameter '{}'.", part)))?;
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(AppError::parameter(
                    "route",
                    format!("Invalid parameter name '{}'.", name),
                ));
            }
            return Ok(Segment::Param(name.to_string()));
        }

        if part.is_empty() || part.contains(['{', '}', '*', ':']) {
            return Err(AppError::parameter(
                "route",
                format!("Invalid path segment '{}'.", part),
            ));
        }
        Ok(Segment::Literal(part.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Percent-decoded parameters when `path` matches, `None` otherwise.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(part).ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }
}
