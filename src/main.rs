mod app_settings;
mod logger;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use app_settings::AppSettings;
use clap::{Parser, Subcommand};
use speech_xml::{SpeechInstruction, SpeechXmlResult, SsmlConverter, SsmlParser};

#[derive(Parser, Debug)]
#[command(name = "speech-xml")]
#[command(about = "在语音指令（JSON）和 SSML 之间互相转换", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 覆盖配置中的默认语言，例如 en_US
    #[arg(long, global = true)]
    lang: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 读取 JSON 语音指令数组，输出 SSML
    ToSsml {
        /// 输入文件，省略时从标准输入读取
        file: Option<PathBuf>,
    },
    /// 读取 SSML，输出 JSON 语音指令数组
    FromSsml {
        /// 输入文件，省略时从标准输入读取
        file: Option<PathBuf>,
    },
}

impl Command {
    fn into_parts(self) -> (Direction, Option<PathBuf>) {
        match self {
            Self::ToSsml { file } => (Direction::ToSsml, file),
            Self::FromSsml { file } => (Direction::FromSsml, file),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToSsml,
    FromSsml,
}

fn main() {
    let cli = Cli::parse();
    let settings = AppSettings::load();
    logger::init_global_logger(&settings.log_settings);

    let (direction, file) = cli.command.into_parts();
    let source = match read_input(file.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            log::error!("读取输入失败: {e}");
            process::exit(1);
        }
    };

    let default_language = cli.lang.unwrap_or(settings.ssml_settings.default_language);
    match run(direction, &source, &default_language) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{output}") {
                log::error!("写入输出失败: {e}");
                process::exit(1);
            }
        }
        Err(e) => {
            log::error!("转换失败: {e}");
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn run(direction: Direction, source: &str, default_language: &str) -> SpeechXmlResult<String> {
    match direction {
        Direction::ToSsml => {
            let instructions: Vec<SpeechInstruction> = serde_json::from_str(source)?;
            log::info!("转换 {} 条语音指令为 SSML", instructions.len());
            Ok(SsmlConverter::new(default_language).convert_to_xml(&instructions))
        }
        Direction::FromSsml => {
            let instructions = SsmlParser::new().convert_from_xml(source)?;
            log::info!("从 SSML 解析出 {} 条语音指令", instructions.len());
            Ok(serde_json::to_string_pretty(&instructions)?)
        }
    }
}
