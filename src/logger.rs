use chrono::Local;
use fern::Dispatch;
use std::fs;
use std::path::PathBuf;

use crate::app_settings::{LogSettings, project_dirs};

fn get_log_file_path() -> Result<PathBuf, String> {
    if let Some(proj_dirs) = project_dirs() {
        let log_dir = proj_dirs.data_local_dir();
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)
                .map_err(|e| format!("无法创建日志目录 {log_dir:?}: {e}"))?;
        }
        Ok(log_dir.join("speech-xml.log"))
    } else {
        let current_dir_log_path = PathBuf::from("speech-xml.log");
        eprintln!("无法获取项目日志目录，将尝试在当前目录创建日志: {current_dir_log_path:?}");
        Ok(current_dir_log_path)
    }
}

/// 初始化全局日志记录器：控制台输出到 stderr（stdout 留给转换结果），可选写入日志文件。
pub fn init_global_logger(settings: &LogSettings) {
    let base_dispatch = Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "[{}][{}][{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
            record.level(),
            record.target(),
            message
        ));
    });

    let console_dispatch = Dispatch::new()
        .level(settings.console_log_level)
        .chain(std::io::stderr());

    let mut final_dispatch = base_dispatch.chain(console_dispatch);

    if settings.enable_file_log {
        match get_log_file_path() {
            Ok(log_file_path) => match fern::log_file(&log_file_path) {
                Ok(log_file) => {
                    final_dispatch = final_dispatch.chain(
                        Dispatch::new()
                            .level(settings.file_log_level)
                            .chain(log_file),
                    );
                }
                Err(e) => {
                    eprintln!("无法打开日志文件 {log_file_path:?}: {e}。文件日志将被禁用。");
                }
            },
            Err(e) => eprintln!("获取日志文件路径失败: {e}。文件日志将被禁用。"),
        }
    }

    if let Err(e) = final_dispatch.apply() {
        eprintln!("日志记录器初始化失败: {e}");
    } else {
        log::debug!("日志记录器已初始化。");
    }
}
