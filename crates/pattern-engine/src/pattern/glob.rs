//! 글롭 매칭 -- include/exclude 목록과 버전 앵커
//!
//! 모든 글롭은 대소문자를 구분하지 않으며 `*`는 `/`를 넘지 않습니다.

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::error::PatternEngineError;

/// 콤마로 구분된 글롭 목록
#[derive(Debug, Clone)]
pub struct GlobList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl GlobList {
    /// 콤마로 구분된 패턴 문자열을 컴파일합니다.
    ///
    /// 빈 항목은 무시하고, 선행 `/`는 제거합니다. `[...]`와 `{...}` 안의 콤마는
    /// 구분자가 아닙니다.
    pub fn parse(csv: &str) -> Result<Self, PatternEngineError> {
        let patterns: Vec<String> = split_patterns(csv)
            .into_iter()
            .map(str::trim)
            .map(|p| p.trim_start_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(build_glob(pattern)?);
        }
        let set = builder
            .build()
            .map_err(|e| PatternEngineError::InvalidPattern {
                pattern: csv.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self { patterns, set })
    }

    /// 경로가 목록의 패턴 중 하나와 일치하는지 확인합니다.
    pub fn is_match(&self, path: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(path)
    }

    /// 패턴이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 정리된 패턴 목록
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// 컴파일된 버전 앵커
///
/// 리터럴 앵커는 세그먼트 경계의 `ends_with`로, 와일드카드 앵커는 `**/<anchor>` 글롭으로
/// 판정합니다. 입력 경로는 정규화된 소문자 경로여야 합니다.
#[derive(Debug, Clone)]
pub enum AnchorPattern {
    /// 와일드카드 없는 앵커
    Literal {
        /// 소문자 앵커
        anchor: String,
    },
    /// `*`를 포함한 앵커
    Wildcard {
        /// 가장 긴 리터럴 조각 (사전 필터)
        filter: String,
        /// `**/<anchor>` 매처
        matcher: GlobMatcher,
    },
}

impl AnchorPattern {
    /// 정규화된 앵커 문자열을 컴파일합니다.
    ///
    /// `**` 검증은 호출자 책임입니다.
    pub fn compile(anchor: &str) -> Result<Self, PatternEngineError> {
        let anchor = anchor.to_lowercase();
        if !anchor.contains('*') {
            return Ok(Self::Literal { anchor });
        }

        let filter = anchor
            .split('*')
            .max_by_key(|piece| piece.len())
            .unwrap_or_default()
            .to_owned();
        let matcher = build_glob(&format!("**/{}", escape_glob_meta(&anchor)))?.compile_matcher();
        Ok(Self::Wildcard { filter, matcher })
    }

    /// 사전 필터로 쓰이는 가장 긴 리터럴 조각
    pub fn literal_filter(&self) -> &str {
        match self {
            Self::Literal { anchor } => anchor,
            Self::Wildcard { filter, .. } => filter,
        }
    }

    /// 소문자 경로가 앵커를 만족하는지 확인합니다.
    pub fn is_match(&self, lower_path: &str) -> bool {
        if !lower_path.contains(self.literal_filter()) {
            return false;
        }
        match self {
            Self::Literal { anchor } => lower_path
                .strip_suffix(anchor.as_str())
                .is_some_and(|head| head.is_empty() || head.ends_with('/')),
            Self::Wildcard { matcher, .. } => matcher.is_match(lower_path),
        }
    }
}

fn build_glob(pattern: &str) -> Result<Glob, PatternEngineError> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map_err(|e| PatternEngineError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })
}

/// 최상위 콤마에서만 나눕니다.
fn split_patterns(csv: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut braces = 0usize;
    // 열린 문자 클래스의 첫 문자 위치. 그 자리의 `]`는 리터럴
    let mut class_start: Option<usize> = None;

    for (i, c) in csv.char_indices() {
        if let Some(first) = class_start {
            if c == ']' && i != first {
                class_start = None;
            }
            continue;
        }
        match c {
            '[' => class_start = Some(i + 1),
            '{' => braces += 1,
            '}' => braces = braces.saturating_sub(1),
            ',' if braces == 0 => {
                pieces.push(&csv[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&csv[start..]);
    pieces
}

fn escape_chars(text: &str, meta: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if meta.contains(&c) {
            escaped.push('[');
            escaped.push(c);
            escaped.push(']');
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// 앵커 문법에 없는 글롭 메타문자를 문자 클래스로 감쌉니다.
fn escape_glob_meta(anchor: &str) -> String {
    escape_chars(anchor, &['?', '[', ']', '{', '}'])
}

/// 리터럴 텍스트를 글롭 목록에 안전하게 넣을 수 있도록 이스케이프합니다.
///
/// `*`와 콤마를 포함한 모든 메타문자가 자기 자신만 매칭합니다.
pub fn escape_literal(text: &str) -> String {
    escape_chars(text, &['*', '?', '[', ']', '{', '}', ','])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_list_splits_and_trims() {
        let list = GlobList::parse(" foo/** , ,/bar/*.js").unwrap();
        assert_eq!(list.patterns(), ["foo/**", "bar/*.js"]);
        assert!(list.is_match("foo/index.js"));
        assert!(list.is_match("FOO/lib/deep/x.js"));
        assert!(list.is_match("bar/a.js"));
        assert!(!list.is_match("bar/sub/a.js"));
    }

    #[test]
    fn empty_glob_list_matches_nothing() {
        let list = GlobList::parse("").unwrap();
        assert!(list.is_empty());
        assert!(!list.is_match("anything"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = GlobList::parse("foo/[").unwrap_err();
        assert!(matches!(err, PatternEngineError::InvalidPattern { .. }));
    }

    #[test]
    fn glob_list_keeps_commas_inside_groups() {
        let list = GlobList::parse("{a,b}/*.js,c[,]d/**").unwrap();
        assert_eq!(list.patterns(), ["{a,b}/*.js", "c[,]d/**"]);
        assert!(list.is_match("b/x.js"));
        assert!(list.is_match("c,d/deep/x"));
    }

    #[test]
    fn escaped_literal_matches_only_itself() {
        let dir = escape_literal("weird[{x,y}?*");
        let list = GlobList::parse(&format!("{dir}/**,other/**")).unwrap();
        assert_eq!(list.patterns().len(), 2);
        assert!(list.is_match("weird[{x,y}?*/package.json"));
        assert!(!list.is_match("weirdx/package.json"));
        assert!(list.is_match("other/a"));
    }

    #[test]
    fn literal_anchor_respects_segment_boundary() {
        let anchor = AnchorPattern::compile("Foo/package.json").unwrap();
        assert!(anchor.is_match("app/node_modules/foo/package.json"));
        assert!(anchor.is_match("foo/package.json"));
        assert!(!anchor.is_match("app/xfoo/package.json"));
        assert!(!anchor.is_match("app/foo/package.json.bak"));
    }

    #[test]
    fn wildcard_anchor_matches_single_segment() {
        let anchor = AnchorPattern::compile("*/release").unwrap();
        assert_eq!(anchor.literal_filter(), "/release");
        assert!(anchor.is_match("a/release"));
        assert!(anchor.is_match("x/y/b/release"));
        assert!(!anchor.is_match("release"));
        assert!(!anchor.is_match("a/release/notes"));
    }

    #[test]
    fn wildcard_anchor_escapes_glob_meta() {
        let anchor = AnchorPattern::compile("lib*/x?.txt").unwrap();
        assert!(anchor.is_match("root/lib64/x?.txt"));
        assert!(!anchor.is_match("root/lib64/xa.txt"));
    }
}
