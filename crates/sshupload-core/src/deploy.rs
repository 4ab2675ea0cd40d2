// sshupload Deploy Step
//
// 배포 파이프라인에서 호출되는 단계
//   configure : 필수 설정 검사 + 기본값 적용 (누락 시 네트워크 접근 전에 실패)
//   upload    : 파일 선택 → 개인키 읽기 → Uploader 호출 → 요약 반환
//
// 교체 지점:
//   with_uploader : 업로드 구현 전체를 교체
//   with_session  : 미리 인증된 세션 사용 (연결 단계만 생략)

use std::sync::Arc;

use crate::config::{ConnectConfig, Credentials, DeployConfig, ResolvedConfig};
use crate::error::{Error, Result};
use crate::log::DeployLog;
use crate::select::select;
use crate::session::{Connector, PrebuiltSession, RusshConnector, SshSession};
use crate::upload::{SshUploader, UploadRequest, Uploader};

#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub files_uploaded: Vec<String>,
}

pub struct DeployStep {
    config: DeployConfig,
    log: Arc<dyn DeployLog>,
    uploader: Option<Arc<dyn Uploader>>,
    session: Option<Arc<dyn SshSession>>,
}

impl DeployStep {
    pub fn new(config: DeployConfig, log: Arc<dyn DeployLog>) -> Self {
        Self { config, log, uploader: None, session: None }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_session(mut self, session: Arc<dyn SshSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// 설정 검증 + 기본값 적용
    ///
    /// 누락된 필수 필드는 하나씩 에러 로그 후 MissingConfig
    /// 적용된 기본값은 verbose 로그
    pub fn configure(&self) -> Result<ResolvedConfig> {
        let log = self.log.clone();
        let resolved = self.config.clone().resolve(|name, value| {
            log.verbose(&format!("Missing config: {}, using default: {}", name, value));
        });

        if let Err(Error::MissingConfig(fields)) = &resolved {
            for field in fields {
                self.log.error(&format!("Missing required config: `{}`", field));
            }
        }
        resolved
    }

    pub async fn upload(&self) -> Result<UploadSummary> {
        let resolved = self.configure()?;
        self.run(resolved).await.map_err(|e| {
            self.report(&e);
            e
        })
    }

    async fn run(&self, config: ResolvedConfig) -> Result<UploadSummary> {
        let files = select(&config.dist_files, &config.file_pattern)?;

        let private_key = match &config.private_key_file {
            Some(path) => Some(std::fs::read(path).map_err(|e| {
                Error::Config(format!("private key {}: {}", path.display(), e))
            })?),
            None => None,
        };

        let request = UploadRequest {
            connect: ConnectConfig {
                host: config.host.clone(),
                port: config.port,
                username: config.username,
                credentials: Credentials {
                    password: config.password,
                    agent: config.agent,
                    private_key,
                },
            },
            working_dir: config.dist_dir,
            remote_dir: config.remote_dir,
            file_paths: files,
        };

        self.log.verbose(&format!("preparing to upload to SSH host `{}`", config.host));

        let uploaded = self.uploader().upload(request).await?;

        self.log.verbose(&format!("uploaded {} files ok", uploaded.len()));
        Ok(UploadSummary { files_uploaded: uploaded })
    }

    fn uploader(&self) -> Arc<dyn Uploader> {
        if let Some(uploader) = &self.uploader {
            return uploader.clone();
        }
        let connector: Arc<dyn Connector> = match &self.session {
            Some(session) => Arc::new(PrebuiltSession::new(session.clone())),
            None => Arc::new(RusshConnector::default()),
        };
        Arc::new(SshUploader::new(connector, self.log.clone()))
    }

    /// 에러 메시지 + 원인 체인
    fn report(&self, error: &Error) {
        self.log.error(&error.to_string());

        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            self.log.error(&format!("  caused by: {}", cause));
            source = std::error::Error::source(cause);
        }
    }
}
