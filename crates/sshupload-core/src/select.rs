// sshupload File Selector
//
// 후보 파일 목록 중 glob 패턴에 맞는 것만 입력 순서대로 골라냄
//
// 패턴 규칙:
// - {a,b} 중괄호 대안 (중첩 가능) → 먼저 전개한 뒤 GlobSet 하나로 컴파일
// - * ? 는 "/"를 넘지 않음 (디렉토리 세그먼트는 ** 로만)
// - "."으로 시작하는 세그먼트는 패턴 세그먼트도 "."으로 시작해야 매치
// - 빈 패턴은 아무것도 매치하지 않음
// - 지원하지 않음: {1..3} 숫자 범위, 맨 앞 "!" 부정 → 둘 다 문자 그대로 취급

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{Error, Result};

/// 컴파일된 파일 선택기
///
/// 한 번 만들어 여러 후보 목록에 재사용 가능
#[derive(Debug, Clone)]
pub struct FileSelector {
    set: GlobSet,
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone)]
struct Alternative {
    dot_segments: Vec<bool>, // 세그먼트별 "."으로 시작하는지
    globstar: bool,
}

impl FileSelector {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut builder      = GlobSetBuilder::new();
        let mut alternatives = Vec::new();

        if !pattern.is_empty() {
            for alt in expand_braces(pattern) {
                let alt = escape_braces(&alt);
                let glob = GlobBuilder::new(&alt)
                    .literal_separator(true)
                    .backslash_escape(true)
                    .build()
                    .map_err(|e| Error::Pattern {
                        pattern: pattern.to_string(),
                        message: e.kind().to_string(),
                    })?;
                builder.add(glob);

                let segments: Vec<&str> = alt.split('/').collect();
                alternatives.push(Alternative {
                    dot_segments: segments.iter()
                        .map(|s| s.starts_with('.') || s.starts_with("\\."))
                        .collect(),
                    globstar: segments.iter().any(|s| *s == "**"),
                });
            }
        }

        let set = builder.build().map_err(|e| Error::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { set, alternatives })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.set
            .matches(candidate)
            .into_iter()
            .any(|i| self.alternatives[i].allows_dots(candidate))
    }

    /// 매치되는 후보만 입력 순서 그대로 반환
    pub fn select(&self, candidates: &[String]) -> Vec<String> {
        candidates.iter()
            .filter(|c| self.is_match(c))
            .cloned()
            .collect()
    }
}

impl Alternative {
    /// 와일드카드가 "."으로 시작하는 세그먼트를 삼키지 않았는지 확인
    fn allows_dots(&self, candidate: &str) -> bool {
        let dots: Vec<bool> = candidate.split('/').map(|s| s.starts_with('.')).collect();

        if self.globstar {
            // ** 는 dot 디렉토리를 지나가지 않음 → 명시적 "." 세그먼트 수로 근사
            let wanted    = dots.iter().filter(|d| **d).count();
            let available = self.dot_segments.iter().filter(|d| **d).count();
            return wanted <= available;
        }

        dots.iter()
            .zip(&self.dot_segments)
            .all(|(is_dot, pattern_dot)| !is_dot || *pattern_dot)
    }
}

/// select(candidates, pattern): 한 번 쓰고 버리는 경우의 단축형
pub fn select(candidates: &[String], pattern: &str) -> Result<Vec<String>> {
    Ok(FileSelector::new(pattern)?.select(candidates))
}

// ── 중괄호 전개 ──────────────────────────────────────────────────────────────

/// "{.htaccess,*.{js,ico}}" → [".htaccess", "*.js", "*.ico"]
///
/// 쉼표가 없는 {a} 와 짝이 없는 { 는 문자 그대로 유지
fn expand_braces(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut search_from = 0;

    while let Some(open) = find_open(&chars, search_from) {
        let Some(close) = find_close(&chars, open) else {
            search_from = open + 1;
            continue;
        };

        let prefix: String = chars[..open].iter().collect();
        let suffix: String = chars[close + 1..].iter().collect();
        let parts = split_top_level(&chars[open + 1..close]);

        if parts.len() < 2 {
            // {a} → 중괄호는 문자 그대로, 안쪽과 뒤쪽만 전개
            let mut out = Vec::new();
            for inner in expand_braces(&parts[0]) {
                for rest in expand_braces(&suffix) {
                    out.push(format!("{}{{{}}}{}", prefix, inner, rest));
                }
            }
            return out;
        }

        return parts.iter()
            .flat_map(|part| expand_braces(&format!("{}{}", part, suffix)))
            .map(|tail| format!("{}{}", prefix, tail))
            .collect();
    }

    vec![pattern.to_string()]
}

fn find_open(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => i = skip_class(chars, i),
            '{' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn find_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => { i += 2; continue; }
            '[' => { i = skip_class(chars, i); continue; }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 { return Some(i); }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// 문자 클래스 [...] 다음 위치. 닫히지 않으면 "[" 한 글자만 건너뜀
fn skip_class(chars: &[char], open: usize) -> usize {
    let mut i = open + 1;
    if chars.get(i) == Some(&'!') || chars.get(i) == Some(&'^') { i += 1; }
    if chars.get(i) == Some(&']') { i += 1; }
    while i < chars.len() {
        if chars[i] == ']' { return i + 1; }
        i += 1;
    }
    open + 1
}

fn split_top_level(body: &[char]) -> Vec<String> {
    let mut parts   = Vec::new();
    let mut current = String::new();
    let mut depth   = 0;
    let mut i       = 0;

    while i < body.len() {
        let c = body[i];
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = body.get(i + 1) { current.push(*next); }
                i += 2;
                continue;
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                i += 1;
                continue;
            }
            _ => {}
        }
        current.push(c);
        i += 1;
    }
    parts.push(current);
    parts
}

/// 전개 후 남은 중괄호는 문자 그대로 → globset이 대안으로 해석하지 않도록 escape
/// 문자 클래스 [...] 안쪽은 그대로 둠
fn escape_braces(alt: &str) -> String {
    let chars: Vec<char> = alt.chars().collect();
    let mut out = String::with_capacity(alt.len());
    let mut i   = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.extend(&chars[i..(i + 2).min(chars.len())]);
                i += 2;
            }
            '[' => {
                let end = skip_class(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            c @ ('{' | '}') => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_dist_files_in_input_order() {
        let candidates = strings(&["favicon.ico", "manifest.json", "sw.js", ".htaccess", "assets/test.js"]);
        let selected = select(&candidates, "{.htaccess,*.{js,ico,json}}").unwrap();
        assert_eq!(selected, strings(&["favicon.ico", "manifest.json", "sw.js", ".htaccess"]));
    }

    #[test]
    fn default_pattern_covers_common_assets() {
        let candidates = strings(&["index.html", "app.css", "app.css.map", "robots.txt", "logo.svg", "assets/app.js"]);
        let selected = select(&candidates, crate::config::DEFAULT_FILE_PATTERN).unwrap();
        assert_eq!(selected, strings(&["app.css", "app.css.map", "robots.txt", "logo.svg"]));
    }

    #[test]
    fn empty_inputs() {
        assert!(select(&[], "*.js").unwrap().is_empty());
        assert!(select(&strings(&["a.js"]), "").unwrap().is_empty());
        assert!(select(&strings(&["a.js"]), "*.css").unwrap().is_empty());
    }

    #[test]
    fn wildcard_does_not_match_leading_dot() {
        let candidates = strings(&[".eslintrc.js", "main.js", ".well-known/x.js"]);
        assert_eq!(select(&candidates, "*.js").unwrap(), strings(&["main.js"]));
        assert_eq!(select(&candidates, ".*.js").unwrap(), strings(&[".eslintrc.js"]));
        assert_eq!(select(&candidates, "*/*.js").unwrap(), Vec::<String>::new());
        assert_eq!(select(&candidates, ".well-known/*.js").unwrap(), strings(&[".well-known/x.js"]));
    }

    #[test]
    fn globstar_crosses_directories() {
        let candidates = strings(&["sw.js", "assets/test.js", "assets/img/a.png", ".cache/b.js"]);
        assert_eq!(select(&candidates, "**/*.js").unwrap(), strings(&["sw.js", "assets/test.js"]));
    }

    #[test]
    fn duplicates_in_input_are_kept_not_added() {
        let candidates = strings(&["a.js", "a.js", "b.css"]);
        // 두 대안이 모두 a.js에 매치해도 한 번만
        assert_eq!(select(&candidates, "{a.*,*.js}").unwrap(), strings(&["a.js", "a.js"]));
    }

    #[test]
    fn brace_expansion() {
        assert_eq!(expand_braces("{.htaccess,*.{js,ico}}"), strings(&[".htaccess", "*.js", "*.ico"]));
        assert_eq!(expand_braces("a{b,c}d{e,f}"), strings(&["abde", "abdf", "acde", "acdf"]));
        assert_eq!(expand_braces("{single}"), strings(&["{single}"]));
        assert_eq!(expand_braces("open{brace"), strings(&["open{brace"]));
        assert_eq!(expand_braces("[{,}]x"), strings(&["[{,}]x"]));
    }

    #[test]
    fn literal_braces_match_literally() {
        let candidates = strings(&["{single}", "single"]);
        assert_eq!(select(&candidates, "{single}").unwrap(), strings(&["{single}"]));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = FileSelector::new("[a-").unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn selected_is_subsequence_and_rest_do_not_match() {
        let candidates = strings(&["a.js", "b.css", "c/d.js", ".e.js", "f.json", "g.js"]);
        let selector = FileSelector::new("{*.js,*.json}").unwrap();
        let selected = selector.select(&candidates);

        let mut it = candidates.iter();
        for s in &selected {
            assert!(it.any(|c| c == s), "{} out of order", s);
        }
        for c in &candidates {
            assert_eq!(selected.contains(c), selector.is_match(c));
        }
        assert_eq!(selected, strings(&["a.js", "f.json", "g.js"]));
    }

    #[test]
    fn numeric_ranges_and_negation_are_literal() {
        let candidates = strings(&["a1.js", "a{1..3}.js", "!sw.js", "sw.js"]);
        assert_eq!(select(&candidates, "a{1..3}.js").unwrap(), strings(&["a{1..3}.js"]));
        assert_eq!(select(&candidates, "!sw.js").unwrap(), strings(&["!sw.js"]));
    }
}
