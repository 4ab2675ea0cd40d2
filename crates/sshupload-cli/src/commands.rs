// sshupload CLI Arguments
//
// 순수 파싱만 담당 (IO 없음, 테스트 용이)
// 플래그로 준 값만 DeployConfig에 채움 → 설정 파일과 merge

use std::path::PathBuf;

use clap::Parser;
use sshupload_core::config::DeployConfig;

#[derive(Debug, Parser)]
#[command(name = "sshupload", version, about = "Upload dist files to an SSH host over SFTP")]
pub struct Args {
    /// TOML 설정 파일 (플래그가 파일 값을 덮어씀)
    #[arg(short, long, env = "SSHUPLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SSHUPLOAD_HOST")]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(short, long, env = "SSHUPLOAD_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SSHUPLOAD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSH agent 소켓 경로
    #[arg(long)]
    pub agent: Option<PathBuf>,

    #[arg(short = 'i', long)]
    pub private_key_file: Option<PathBuf>,

    /// 리모트 경로 prefix (끝의 "/" 포함해서 지정)
    #[arg(short, long)]
    pub remote_dir: Option<String>,

    #[arg(short, long)]
    pub dist_dir: Option<PathBuf>,

    #[arg(short, long)]
    pub file_pattern: Option<String>,

    /// 연결하지 않고 업로드될 경로만 출력
    #[arg(long)]
    pub dry_run: bool,

    /// debug 로그 출력 (RUST_LOG가 있으면 그쪽이 우선)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn deploy_config(&self) -> DeployConfig {
        DeployConfig {
            host: self.host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            port: self.port,
            agent: self.agent.clone(),
            private_key_file: self.private_key_file.clone(),
            remote_dir: self.remote_dir.clone(),
            dist_dir: self.dist_dir.clone(),
            dist_files: None,
            file_pattern: self.file_pattern.clone(),
        }
    }
}
