// sshupload SFTP channel (russh-sftp 기반)
//
// SftpChannel      : 세션 위에 열린 파일 전송 채널 (쓰기 스트림 생성만 필요)
// RemoteWriter     : 리모트 파일 쓰기 스트림 (tokio AsyncWrite)
// RusshSftpChannel : russh-sftp SftpSession 구현

use std::pin::Pin;

use async_trait::async_trait;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::OpenFlags;
use tokio::io::AsyncWrite;

use crate::error::{Error, Result};

pub type RemoteWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// 파일 전송 채널
///
/// 업로드 1회 동안 모든 파일이 하나의 채널을 공유 (&self로만 접근)
/// 파일마다 create()로 독립된 쓰기 스트림을 얻음
#[async_trait]
pub trait SftpChannel: Send + Sync {
    /// 리모트 파일을 생성(또는 덮어쓰기)하고 쓰기 스트림 반환
    async fn create(&self, path: &str) -> Result<RemoteWriter>;
}

pub struct RusshSftpChannel {
    sftp: SftpSession,
}

impl RusshSftpChannel {
    pub fn new(sftp: SftpSession) -> Self {
        Self { sftp }
    }
}

#[async_trait]
impl SftpChannel for RusshSftpChannel {
    async fn create(&self, path: &str) -> Result<RemoteWriter> {
        let file = self.sftp
            .open_with_flags(path, OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE)
            .await
            .map_err(|e| Error::Sftp(e.to_string()))?;
        Ok(Box::pin(file))
    }
}
