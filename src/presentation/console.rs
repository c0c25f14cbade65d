use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{ControllerEvent, Frontend, RelocationChoice};
use crate::presentation::display::{
    print_found, print_relocation_entry, print_relocation_summary, SearchSummary,
};

/// 基于标准输入输出的交互界面
pub struct ConsoleFrontend<R, W> {
    input: R,
    output: W,
    color: bool,
    show_spinner: bool,
    spinner: Option<ProgressBar>,
}

impl<R: BufRead, W: Write> ConsoleFrontend<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
            show_spinner: false,
            spinner: None,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// 搜索期间显示进度动画（否则每次进度输出一行）
    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// 读取一行输入，已到输入末尾时返回 None
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// 交互式获取搜索目录和搜索文本
    pub fn ask_search_inputs(&mut self) -> io::Result<(String, String)> {
        let path = self.prompt("请输入搜索目录: ")?.unwrap_or_default();
        let text = self.prompt("请输入要搜索的文本: ")?.unwrap_or_default();
        writeln!(self.output)?;
        Ok((path, text))
    }

    fn start_spinner(&mut self) {
        if !self.show_spinner {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message("已搜索 0 个文件");
        self.spinner = Some(spinner);
    }

    /// 输出一行；进度动画运行时先暂停动画
    fn emit(&mut self, f: impl FnOnce(&mut W, bool) -> io::Result<()>) {
        let color = self.color;
        let output = &mut self.output;
        let _ = match &self.spinner {
            Some(spinner) => spinner.suspend(|| f(output, color)),
            None => f(output, color),
        };
    }

    fn handle(&mut self, event: ControllerEvent<'_>) -> io::Result<()> {
        match event {
            ControllerEvent::SearchStarted { request } => {
                writeln!(self.output, "搜索内容: '{}'", request.search_text())?;
                writeln!(self.output, "起始目录: {}", request.root_path().display())?;
                writeln!(self.output, "目录较大时可能需要一些时间...\n")?;
                self.start_spinner();
            }
            ControllerEvent::Progress { files_searched } => match &self.spinner {
                Some(spinner) => {
                    spinner.set_message(format!("已搜索 {} 个文件", files_searched));
                    spinner.tick();
                }
                None => writeln!(self.output, "已搜索 {} 个文件...", files_searched)?,
            },
            ControllerEvent::Found(path) => {
                self.emit(|out, color| print_found(out, path, color));
            }
            ControllerEvent::SearchFinished { files_searched, files_found, elapsed } => {
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
                SearchSummary { files_searched, files_found, elapsed }.print(&mut self.output)?;
            }
            ControllerEvent::NoMatches { search_text } => {
                writeln!(self.output, "\n没有文件包含 '{}'", search_text)?;
            }
            ControllerEvent::CreatingDestination(path) => {
                writeln!(self.output, "创建目录: {}", path.display())?;
            }
            ControllerEvent::DestinationFailed { path, error } => {
                writeln!(self.output, "无法创建目录 {}: {}", path.display(), error)?;
            }
            ControllerEvent::RelocationStarted { mode, count, dest_dir } => {
                writeln!(self.output, "\n正在{} {} 个文件到: {}", mode, count, dest_dir.display())?;
            }
            ControllerEvent::Relocated(entry) => {
                print_relocation_entry(&mut self.output, entry, self.color)?;
            }
            ControllerEvent::RelocationFinished(report) => {
                print_relocation_summary(&mut self.output, report)?;
            }
            ControllerEvent::MoveCancelled => {
                writeln!(self.output, "已取消移动。")?;
            }
            ControllerEvent::NoDestination => {
                writeln!(self.output, "未提供目标目录，只显示结果。")?;
            }
        }
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Frontend for ConsoleFrontend<R, W> {
    fn notify(&mut self, event: ControllerEvent<'_>) {
        // 控制台写入失败不影响搜索和搬移本身
        let _ = self.handle(event);
    }

    fn choose_action(&mut self, _files_found: u64) -> io::Result<RelocationChoice> {
        writeln!(self.output, "\n接下来要做什么?")?;
        writeln!(self.output, "1) 复制文件到其他目录")?;
        writeln!(self.output, "2) 移动文件到其他目录")?;
        writeln!(self.output, "3) 只显示结果 (不做任何操作)")?;

        let choice = self.prompt("请输入选项 [1-3]: ")?;
        Ok(match choice.as_deref().map(str::trim) {
            Some("1") => RelocationChoice::Copy,
            Some("2") => RelocationChoice::Move,
            _ => RelocationChoice::ShowOnly,
        })
    }

    fn destination_dir(&mut self) -> io::Result<Option<PathBuf>> {
        Ok(self
            .prompt("请输入目标目录: ")?
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from))
    }

    fn confirm_move(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n警告: 移动文件是永久性的!")?;
        writeln!(self.output, "文件将从原位置删除。")?;
        writeln!(self.output, "如有需要请先做好备份。\n")?;

        let answer = self.prompt("确定吗? (yes/no): ")?;
        Ok(matches!(
            answer.map(|a| a.trim().to_ascii_lowercase()).as_deref(),
            Some("yes") | Some("y")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    fn console(input: &str) -> ConsoleFrontend<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleFrontend::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output_of(console: &mut ConsoleFrontend<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.output_mut().clone()).unwrap()
    }

    #[test]
    fn test_ask_search_inputs() {
        let mut c = console("/data\r\nHello World\n");
        let (path, text) = c.ask_search_inputs().unwrap();
        assert_eq!(path, "/data");
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn test_ask_search_inputs_at_eof() {
        let mut c = console("");
        assert_eq!(c.ask_search_inputs().unwrap(), (String::new(), String::new()));
    }

    #[test]
    fn test_choose_action() {
        assert_eq!(console("1\n").choose_action(3).unwrap(), RelocationChoice::Copy);
        assert_eq!(console(" 2 \n").choose_action(3).unwrap(), RelocationChoice::Move);
        assert_eq!(console("3\n").choose_action(3).unwrap(), RelocationChoice::ShowOnly);
        assert_eq!(console("x\n").choose_action(3).unwrap(), RelocationChoice::ShowOnly);
        assert_eq!(console("").choose_action(3).unwrap(), RelocationChoice::ShowOnly);
    }

    #[test]
    fn test_confirm_move() {
        assert!(console("yes\n").confirm_move().unwrap());
        assert!(console("Y\n").confirm_move().unwrap());
        assert!(!console("no\n").confirm_move().unwrap());
        assert!(!console("").confirm_move().unwrap());

        let mut c = console("n\n");
        c.confirm_move().unwrap();
        assert!(output_of(&mut c).contains("警告: 移动文件是永久性的!"));
    }

    #[test]
    fn test_destination_dir() {
        assert_eq!(console(" /out \n").destination_dir().unwrap(), Some(PathBuf::from("/out")));
        assert_eq!(console("\n").destination_dir().unwrap(), None);
        assert_eq!(console("   \n").destination_dir().unwrap(), None);
        assert_eq!(console("").destination_dir().unwrap(), None);
    }

    #[test]
    fn test_run_ends_normally_without_destination() {
        use crate::application::{Config, Controller, ControllerState};
        use crate::infrastructure::{ErrorLogger, InMemoryFs, Logger};

        let fs = InMemoryFs::new();
        fs.add_file("/root/a.txt", "hello world");
        let config = Config::default();
        let logger = Logger::disabled();
        let error_logger = ErrorLogger::new(false).unwrap();

        // 输入在目标目录提示处结束，以及目标目录为空行
        for input in ["1\n", "1\n\n", "2\n"] {
            let mut c = console(input);
            let mut controller = Controller::new(&fs, &config, &logger, &error_logger);
            let summary = controller.run("/root", "hello", &mut c).unwrap();

            assert!(summary.relocation.is_none());
            assert_eq!(controller.state(), ControllerState::Done);
            assert!(fs.is_file("/root/a.txt"));
            assert!(output_of(&mut c).contains("未提供目标目录，只显示结果。"));
        }
    }

    #[test]
    fn test_progress_and_found_lines_without_spinner() {
        let mut c = console("");
        c.notify(ControllerEvent::Progress { files_searched: 100 });
        c.notify(ControllerEvent::Found(Path::new("/r/a.txt")));
        c.notify(ControllerEvent::MoveCancelled);

        assert_eq!(output_of(&mut c), "已搜索 100 个文件...\n找到: /r/a.txt\n已取消移动。\n");
    }
}
