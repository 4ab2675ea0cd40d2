// sshupload Utils
//
// 공통 유틸 함수 모음
// - fmt_size      : 바이트 → 사람이 읽기 좋은 단위 (1.2MB 등)
// - remote_target : 리모트 디렉토리 + 상대경로 (단순 문자열 결합)
// - local_path    : 작업 디렉토리 + 상대경로 (OS 구분자 처리)
// - list_files    : 로컬 디렉토리 아래 파일 전체 (재귀, 상대경로)

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// 바이트 → 사람이 읽기 좋은 단위 문자열
pub fn fmt_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB      { format!("{:.1}GB", bytes as f64 / GB as f64) }
    else if bytes >= MB { format!("{:.1}MB", bytes as f64 / MB as f64) }
    else if bytes >= KB { format!("{:.1}KB", bytes as f64 / KB as f64) }
    else                { format!("{}B",     bytes) }
}

/// 업로드 대상 리모트 경로
///
/// 정규화 없음: "aaaa/" + "sw.js" → "aaaa/sw.js", "aaaa" + "sw.js" → "aaaasw.js"
/// 끝의 구분자는 호출자 책임
pub fn remote_target(remote_dir: &str, file: &str) -> String {
    format!("{}{}", remote_dir, file)
}

/// 작업 디렉토리 기준 로컬 경로
///
/// 상대경로는 "/" 구분자로 들어오므로 세그먼트 단위로 join → Windows에서도 동작
pub fn local_path(working_dir: &Path, file: &str) -> PathBuf {
    file.split('/')
        .filter(|s| !s.is_empty())
        .fold(working_dir.to_path_buf(), |acc, seg| acc.join(seg))
}

/// 디렉토리 아래 일반 파일 전체를 "/" 구분 상대경로로 반환 (이름 오름차순)
///
/// 심볼릭 링크는 따라가지 않음
/// UTF-8이 아닌 파일 이름은 패턴 매칭/리모트 경로에 쓸 수 없으므로 InvalidData 에러
pub fn list_files(root: &Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file name is not valid UTF-8: {}", entry.path().display()),
            ))?;
        files.push(segments.join("/"));
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_target_is_plain_concatenation() {
        assert_eq!(remote_target("aaaa/", "manifest.json"), "aaaa/manifest.json");
        assert_eq!(remote_target("aaaa/", ".htaccess"), "aaaa/.htaccess");
        assert_eq!(remote_target("aaaa", "sw.js"), "aaaasw.js");
        assert_eq!(remote_target("", "sw.js"), "sw.js");
    }

    #[test]
    fn local_path_joins_segments() {
        let p = local_path(Path::new("/srv/dist"), "assets/test.js");
        assert_eq!(p, Path::new("/srv/dist").join("assets").join("test.js"));
    }

    #[test]
    fn fmt_size_units() {
        assert_eq!(fmt_size(512), "512B");
        assert_eq!(fmt_size(1536), "1.5KB");
        assert_eq!(fmt_size(3 * 1024 * 1024), "3.0MB");
    }

    #[test]
    fn list_files_walks_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sw.js"), b"x").unwrap();
        std::fs::write(dir.path().join(".htaccess"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        std::fs::write(dir.path().join("assets/test.js"), b"x").unwrap();
        std::fs::write(dir.path().join("assets/img/logo.png"), b"x").unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(files, vec![".htaccess", "assets/img/logo.png", "assets/test.js", "sw.js"]);
    }

    #[test]
    fn list_files_on_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn list_files_rejects_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sw.js"), b"x").unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.js")), b"x").unwrap();

        let err = list_files(dir.path()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("caf"));
    }
}
