// sshupload Config
//
// ConnectConfig : 세션 하나를 여는 데 필요한 값 (host/port/user + 인증 수단)
// DeployConfig  : 배포 단계의 설정 묶음 (TOML 파일 + CLI 플래그를 merge)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_FILE_PATTERN: &str =
    "{.htaccess,*.{js,css,png,gif,ico,jpg,map,json,xml,txt,svg}}";
pub const DEFAULT_DIST_DIR: &str = "dist";

/// 인증 수단. 여러 개가 동시에 올 수 있음
///
/// 시도 순서: private_key → agent → password
#[derive(Clone, Default)]
pub struct Credentials {
    pub password: Option<String>,
    pub agent: Option<PathBuf>,     // SSH agent 소켓 경로
    pub private_key: Option<Vec<u8>>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.agent.is_none() && self.private_key.is_none()
    }
}

// 비밀번호/키 내용은 로그에 남기지 않음
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("agent", &self.agent)
            .field("private_key", &self.private_key.as_ref().map(|k| format!("<{} bytes>", k.len())))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub credentials: Credentials,
}

impl ConnectConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 배포 설정 묶음
///
/// 모든 필드가 Option: 파일/플래그 어디서든 빠질 수 있고,
/// 필수 여부는 [`DeployConfig::resolve`]에서 한 번에 검사
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeployConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
    pub agent: Option<PathBuf>,
    #[serde(alias = "private_key_file")]
    pub private_key_file: Option<PathBuf>,
    #[serde(alias = "remote_dir")]
    pub remote_dir: Option<String>,
    #[serde(alias = "dist_dir")]
    pub dist_dir: Option<PathBuf>,
    #[serde(alias = "dist_files")]
    pub dist_files: Option<Vec<String>>,
    #[serde(alias = "file_pattern")]
    pub file_pattern: Option<String>,
}

/// 검증 + 기본값 적용이 끝난 설정
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    pub port: u16,
    pub agent: Option<PathBuf>,
    pub private_key_file: Option<PathBuf>,
    pub remote_dir: String,
    pub dist_dir: PathBuf,
    pub dist_files: Vec<String>,
    pub file_pattern: String,
}

impl DeployConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// other에 값이 있는 필드만 덮어씀 (CLI 플래그 > 설정 파일)
    pub fn merge(self, other: DeployConfig) -> DeployConfig {
        DeployConfig {
            host:             other.host.or(self.host),
            username:         other.username.or(self.username),
            password:         other.password.or(self.password),
            port:             other.port.or(self.port),
            agent:            other.agent.or(self.agent),
            private_key_file: other.private_key_file.or(self.private_key_file),
            remote_dir:       other.remote_dir.or(self.remote_dir),
            dist_dir:         other.dist_dir.or(self.dist_dir),
            dist_files:       other.dist_files.or(self.dist_files),
            file_pattern:     other.file_pattern.or(self.file_pattern),
        }
    }

    /// 누락된 필수 필드 목록 (없으면 빈 Vec)
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.is_none()       { missing.push("host"); }
        if self.username.is_none()   { missing.push("username"); }
        if self.remote_dir.is_none() { missing.push("remote_dir"); }
        missing
    }

    /// 필수 필드 검사 후 기본값 적용
    ///
    /// on_default: 기본값이 적용된 (필드명, 값)마다 호출
    /// dist_files가 없으면 dist_dir 아래 파일 전체를 나열 (이 경우만 IO 발생)
    pub fn resolve<F>(self, mut on_default: F) -> Result<ResolvedConfig>
    where
        F: FnMut(&str, &str),
    {
        let missing = self.missing_required();
        let (Some(host), Some(username), Some(remote_dir)) =
            (self.host, self.username, self.remote_dir)
        else {
            return Err(Error::MissingConfig(missing));
        };

        let file_pattern = self.file_pattern.unwrap_or_else(|| {
            on_default("file_pattern", DEFAULT_FILE_PATTERN);
            DEFAULT_FILE_PATTERN.to_string()
        });

        let dist_dir = self.dist_dir.unwrap_or_else(|| {
            on_default("dist_dir", DEFAULT_DIST_DIR);
            PathBuf::from(DEFAULT_DIST_DIR)
        });

        let dist_files = match self.dist_files {
            Some(files) => files,
            None => {
                let files = crate::utils::list_files(&dist_dir)
                    .map_err(|e| Error::Config(format!("dist_dir {}: {}", dist_dir.display(), e)))?;
                on_default("dist_files", &format!("{} files under {}", files.len(), dist_dir.display()));
                files
            }
        };

        let port = self.port.unwrap_or(DEFAULT_PORT);

        Ok(ResolvedConfig {
            host,
            username,
            password: self.password,
            port,
            agent: self.agent,
            private_key_file: self.private_key_file,
            remote_dir,
            dist_dir,
            dist_files,
            file_pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> DeployConfig {
        DeployConfig {
            host: Some("aaaa".into()),
            username: Some("bbbb".into()),
            remote_dir: Some("cccc/".into()),
            dist_files: Some(vec!["sw.js".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn parses_kebab_and_snake_case_keys() {
        let cfg = DeployConfig::from_toml_str(r#"
            host = "example.com"
            username = "deploy"
            remote-dir = "/var/www/"
            file_pattern = "*.js"
            port = 2222
        "#).unwrap();

        assert_eq!(cfg.host.as_deref(), Some("example.com"));
        assert_eq!(cfg.remote_dir.as_deref(), Some("/var/www/"));
        assert_eq!(cfg.file_pattern.as_deref(), Some("*.js"));
        assert_eq!(cfg.port, Some(2222));
    }

    #[test]
    fn example_config_parses() {
        let cfg = DeployConfig::from_toml_str(include_str!("../../sshupload-cli/sshupload.example.toml")).unwrap();
        assert!(cfg.missing_required().is_empty());
        assert_eq!(cfg.file_pattern.as_deref(), Some(DEFAULT_FILE_PATTERN));
        assert!(cfg.password.is_none());
    }

    #[test]
    fn unknown_keys_are_config_errors() {
        let err = DeployConfig::from_toml_str("hots = \"typo\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn merge_prefers_the_override() {
        let file = DeployConfig { port: Some(2222), ..complete() };
        let flags = DeployConfig { host: Some("override".into()), ..Default::default() };

        let merged = file.merge(flags);
        assert_eq!(merged.host.as_deref(), Some("override"));
        assert_eq!(merged.username.as_deref(), Some("bbbb"));
        assert_eq!(merged.port, Some(2222));
    }

    #[test]
    fn missing_host_is_rejected() {
        let cfg = DeployConfig { host: None, ..complete() };
        let err = cfg.resolve(|_, _| {}).unwrap_err();
        assert_eq!(err.to_string(), "missing required config: host");
    }

    #[test]
    fn empty_config_lists_all_required_fields() {
        match DeployConfig::default().resolve(|_, _| {}).unwrap_err() {
            Error::MissingConfig(fields) => assert_eq!(fields, vec!["host", "username", "remote_dir"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn defaults_are_reported() {
        let mut defaults = Vec::new();
        let resolved = complete().resolve(|name, value| defaults.push((name.to_string(), value.to_string()))).unwrap();

        assert_eq!(resolved.file_pattern, DEFAULT_FILE_PATTERN);
        assert_eq!(resolved.dist_dir, PathBuf::from(DEFAULT_DIST_DIR));
        assert_eq!(resolved.port, DEFAULT_PORT);
        let names: Vec<&str> = defaults.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["file_pattern", "dist_dir"]);
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials {
            password: Some("hunter2".into()),
            agent: None,
            private_key: Some(vec![0; 32]),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<32 bytes>"));
    }
}
