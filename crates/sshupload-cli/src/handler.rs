// sshupload CLI Handler
//
// 설정 파일 + 플래그 merge → DeployStep 실행
// --dry-run 이면 메모리 세션으로 업로드 경로만 확인

use std::sync::Arc;

use anyhow::Context;
use sshupload_core::config::DeployConfig;
use sshupload_core::log::TracingLog;
use sshupload_core::memory::MemorySession;
use sshupload_core::{DeployStep, UploadSummary};

use crate::commands::Args;

pub async fn run(args: Args) -> anyhow::Result<UploadSummary> {
    let file_config = match &args.config {
        Some(path) => DeployConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DeployConfig::default(),
    };
    let config = file_config.merge(args.deploy_config());

    let mut step = DeployStep::new(config, Arc::new(TracingLog));
    if args.dry_run {
        tracing::info!("dry run: nothing is sent to the remote host");
        step = step.with_session(Arc::new(MemorySession::new()));
    }

    let summary = step.upload().await?;

    if args.dry_run {
        for target in &summary.files_uploaded {
            println!("{}", target);
        }
    }
    Ok(summary)
}
