//! 패턴 컴파일러 -- 접미어 와일드카드 캐시와 글롭 목록
//!
//! - [`PatternCache`]: 컨트리뷰터 접미어(`**/package.json`, `/record` 등)를 정규식으로
//!   변환해 추출 패스 동안 캐싱합니다.
//! - [`glob`]: include/exclude 글롭 목록과 버전 앵커 매처

pub mod glob;

use std::collections::HashMap;

use regex::Regex;

use crate::error::PatternEngineError;

pub use glob::{AnchorPattern, GlobList, escape_literal};

/// 접미어 와일드카드 캐시
///
/// 와일드카드 문자열 그대로를 키로 사용합니다. 추출 패스마다 새로 생성하며
/// 패스 사이에 공유하지 않습니다.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Regex>,
}

impl PatternCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 소문자 경로가 접미어 패턴과 일치하는지 확인합니다.
    ///
    /// 처음 보는 패턴이면 컴파일하여 캐시에 저장합니다.
    pub fn is_match(&mut self, suffix: &str, lower_path: &str) -> Result<bool, PatternEngineError> {
        if let Some(regex) = self.compiled.get(suffix) {
            return Ok(regex.is_match(lower_path));
        }

        let regex = Regex::new(&suffix_to_regex(suffix)).map_err(|e| {
            PatternEngineError::InvalidPattern {
                pattern: suffix.to_owned(),
                reason: e.to_string(),
            }
        })?;
        let matched = regex.is_match(lower_path);
        self.compiled.insert(suffix.to_owned(), regex);
        Ok(matched)
    }

    /// 캐시된 패턴 수
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    /// 캐시가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// 접미어 와일드카드를 정규식 문자열로 변환합니다.
///
/// - 패턴은 소문자로 변환한 뒤 정규식 메타문자를 이스케이프합니다.
/// - 와일드카드가 없으면 문자열 끝에 고정합니다 (`/record` -> `/record$`).
/// - `**/`는 0개 이상의 디렉토리, `**`는 임의 문자열, `*`는 한 세그먼트 안의 문자열입니다.
/// - 와일드카드 패턴은 세그먼트 경계에서 시작해야 합니다.
pub fn suffix_to_regex(suffix: &str) -> String {
    let lower = suffix.to_lowercase();
    if !lower.contains('*') {
        return format!("{}$", regex::escape(&lower));
    }

    let mut pattern = String::with_capacity(lower.len() * 2 + 8);
    pattern.push_str("(?:^|/)");

    let mut literal = String::new();
    let mut chars = lower.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            literal.push(c);
            continue;
        }

        pattern.push_str(&regex::escape(&literal));
        literal.clear();

        if chars.peek() == Some(&'*') {
            chars.next();
            if chars.peek() == Some(&'/') {
                chars.next();
                pattern.push_str("(?:.*/)?");
            } else {
                pattern.push_str(".*");
            }
        } else {
            pattern.push_str("[^/]*");
        }
    }
    pattern.push_str(&regex::escape(&literal));
    pattern.push('$');
    pattern
}
