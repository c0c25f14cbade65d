use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use searchmyfiles::presentation::print_banner;
use searchmyfiles::{
    Config, ConsoleFrontend, Controller, ControllerError, ErrorLogger, Logger, LoggerTrait, RealFs,
};

/// 在目录中查找包含指定文本的文件，并可复制或移动到其他目录
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 要搜索的目录路径（与搜索文本同时给出，否则进入交互模式）
    path: Option<String>,

    /// 要搜索的文本（不区分大小写）
    text: Option<String>,

    /// 配置文件路径，不存在时会创建默认配置
    #[clap(long)]
    config: Option<PathBuf>,

    /// 启用详细日志记录，日志文件保存在当前目录
    #[clap(long)]
    log: bool,

    /// 不使用颜色输出
    #[clap(long)]
    no_color: bool,
}

fn run(args: Args) -> Result<i32> {
    let config = match &args.config {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };

    let logger = Logger::new(args.log)?;
    let error_logger = ErrorLogger::new(args.log)?;

    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let mut console = ConsoleFrontend::new(io::stdin().lock(), stdout.lock())
        .with_color(config.display.color && !args.no_color && interactive)
        .with_spinner(interactive);

    print_banner(console.output_mut())?;

    let (root, text) = match (args.path, args.text) {
        (Some(path), Some(text)) => {
            let out = console.output_mut();
            writeln!(out, "使用命令行参数:")?;
            writeln!(out, "路径: {}", path)?;
            writeln!(out, "搜索文本: {}\n", text)?;
            (path, text)
        }
        _ => console.ask_search_inputs()?,
    };

    let fs = RealFs;
    let mut controller = Controller::new(&fs, &config, &logger, &error_logger);
    let result = controller.run(root, text, &mut console);
    error_logger.finalize()?;

    match result {
        Ok(_) => {
            let out = console.output_mut();
            let relocation_errors = error_logger.relocation_errors();
            if relocation_errors > 0 {
                writeln!(out, "\n⚠️  搬移过程中发生 {} 个错误", relocation_errors)?;
                if error_logger.is_enabled() {
                    writeln!(out, "  详细错误信息请查看: {}", error_logger.error_path().display())?;
                }
            }
            if logger.is_enabled() {
                writeln!(out, "完整日志已保存到: {}", logger.log_path().display())?;
            }
            Ok(0)
        }
        Err(ControllerError::Input(err)) => {
            eprintln!("错误: {}", err);
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("错误: {:#}", err);
            std::process::exit(1);
        }
    }
}
