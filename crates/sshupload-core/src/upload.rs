// sshupload Transfer Orchestrator
//
// UploadRequest : 업로드 1회분 입력 (선택이 끝난 파일 목록 포함)
// Uploader      : upload(request) → 업로드된 리모트 경로 목록
// SshUploader   : 세션 1개 + SFTP 채널 1개 위에서 파일별 쓰기를 동시에 실행
//
// 실패 처리:
// - 연결/인증 실패 → 파일은 하나도 읽거나 쓰지 않음
// - 파일 하나 실패 → 나머지는 끝까지 실행, 결과는 첫 번째 실패 (입력 순서 기준)
// - 재시도 없음

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::io::AsyncWriteExt;

use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::log::DeployLog;
use crate::session::Connector;
use crate::sftp::SftpChannel;
use crate::utils::{fmt_size, local_path, remote_target};

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub connect: ConnectConfig,
    pub working_dir: PathBuf,
    pub remote_dir: String,    // 단순 문자열 prefix, 끝 구분자는 호출자 책임
    pub file_paths: Vec<String>,
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// 전부 성공하면 쓰여진 리모트 경로 목록, 아니면 첫 번째 에러
    async fn upload(&self, request: UploadRequest) -> Result<Vec<String>>;
}

pub struct SshUploader {
    connector: Arc<dyn Connector>,
    log: Arc<dyn DeployLog>,
}

impl SshUploader {
    pub fn new(connector: Arc<dyn Connector>, log: Arc<dyn DeployLog>) -> Self {
        Self { connector, log }
    }
}

#[async_trait]
impl Uploader for SshUploader {
    async fn upload(&self, request: UploadRequest) -> Result<Vec<String>> {
        let session = self.connector.connect(&request.connect).await?;
        let sftp    = session.open_sftp().await?;

        tracing::debug!(
            "[upload] {} files → {}{}",
            request.file_paths.len(), request.connect.host, request.remote_dir,
        );

        // 모든 파일을 먼저 띄우고 전부 끝날 때까지 기다림 (형제 작업 취소 없음)
        let transfers = request.file_paths.iter().map(|file| {
            let sftp = sftp.clone();
            let log  = self.log.clone();
            let request = &request;
            async move {
                let target = remote_target(&request.remote_dir, file);
                match transfer_file(sftp.as_ref(), request, file, &target).await {
                    Ok(bytes) => {
                        tracing::debug!("[upload] {} ({})", target, fmt_size(bytes));
                        log.verbose(&format!("✔  {}", target));
                        Ok(target)
                    }
                    Err(e) => Err(Error::transfer(target, e)),
                }
            }
        });

        join_all(transfers).await.into_iter().collect()
    }
}

/// 파일 1개: 로컬 전체 읽기 → 리모트 생성 → 쓰기 → shutdown
async fn transfer_file(
    sftp: &dyn SftpChannel,
    request: &UploadRequest,
    file: &str,
    target: &str,
) -> Result<u64> {
    let buffer = tokio::fs::read(local_path(&request.working_dir, file)).await?;

    let mut writer = sftp.create(target).await?;
    writer.write_all(&buffer).await?;
    writer.shutdown().await?;

    Ok(buffer.len() as u64)
}
