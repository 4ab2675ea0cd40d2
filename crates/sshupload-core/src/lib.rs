// sshupload Core Library (russh 기반)
//
// 배포 산출물 중 glob 패턴에 맞는 파일만 골라
// SSH 세션 하나 + SFTP 채널 하나로 동시에 업로드

pub mod config;
pub mod deploy;
pub mod error;
pub mod log;
pub mod memory;
pub mod select;
pub mod session;
pub mod sftp;
pub mod state;
pub mod upload;
pub mod utils;

pub use deploy::{DeployStep, UploadSummary};
pub use error::{Error, Result};
pub use upload::{SshUploader, UploadRequest, Uploader};
