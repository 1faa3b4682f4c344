//! Interactive session commands parsed from one input line each.

use std::path::PathBuf;

use shared::domain::{AnalysisMode, DetailLevel};

pub const HELP: &str = "\
commands:
  mode summarize|compare     choose the analysis mode
  file1 <path>               select the primary document
  file2 <path>               select the secondary document (compare mode)
  clear file2                drop the secondary document
  language [name]            response language (blank resets to English)
  detail concise|detailed    summary detail level
  analyze                    run the analysis in the background
  ask <question>             ask a what-if question about the document
  dismiss                    hide the current what-if answer
  export                     download the server's PDF report
  show                       print the current selection and result
  clear                      drop the displayed result
  help                       this text
  quit                       wait for running requests and leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SelectMode(AnalysisMode),
    SelectPrimary(PathBuf),
    SelectSecondary(PathBuf),
    ClearSecondary,
    SetLanguage(String),
    SetDetail(DetailLevel),
    Analyze,
    Ask(String),
    Dismiss,
    Export,
    Show,
    ClearResult,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectMode(_) => "select_mode",
            Self::SelectPrimary(_) => "select_primary",
            Self::SelectSecondary(_) => "select_secondary",
            Self::ClearSecondary => "clear_secondary",
            Self::SetLanguage(_) => "set_language",
            Self::SetDetail(_) => "set_detail",
            Self::Analyze => "analyze",
            Self::Ask(_) => "ask",
            Self::Dismiss => "dismiss",
            Self::Export => "export",
            Self::Show => "show",
            Self::ClearResult => "clear_result",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }

    /// `Ok(None)` for a blank line; `Err` carries a message for the user.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "mode" => Self::SelectMode(rest.parse::<AnalysisMode>().map_err(|e| e.to_string())?),
            "file1" => Self::SelectPrimary(path_arg("file1", rest)?),
            "file2" => Self::SelectSecondary(path_arg("file2", rest)?),
            "clear" if rest.eq_ignore_ascii_case("file2") => Self::ClearSecondary,
            "clear" if rest.is_empty() => Self::ClearResult,
            "clear" => return Err(format!("unknown clear target '{rest}'")),
            "language" | "lang" => Self::SetLanguage(rest.to_string()),
            "detail" => Self::SetDetail(rest.parse::<DetailLevel>().map_err(|e| e.to_string())?),
            "analyze" | "analyse" | "run" => Self::Analyze,
            "ask" | "whatif" | "what-if" => Self::Ask(rest.to_string()),
            "dismiss" => Self::Dismiss,
            "export" => Self::Export,
            "show" | "status" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(cmd))
    }
}

fn path_arg(command: &str, rest: &str) -> Result<PathBuf, String> {
    let rest = rest.trim_matches(|c| c == '"' || c == '\'');
    if rest.is_empty() {
        return Err(format!("{command} needs a file path"));
    }
    Ok(PathBuf::from(rest))
}
