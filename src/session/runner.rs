// src/session/runner.rs
//
// Pattern-matching "runner": nothing is compiled or executed. Output
// statements are picked out of the source with regexes so the candidate
// gets some feedback in the output pane.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Text shown in the output pane before anything has been run.
pub const OUTPUT_PLACEHOLDER: &str =
    "Click \"Run Code\" to execute your program...\nUse Ctrl+Enter as a shortcut to run code";

/// Languages offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Cpp,
    Python,
    Java,
    Html,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Java => "java",
            Language::Html => "html",
        }
    }

    /// Starter code loaded for a question without a draft.
    pub fn template(&self) -> &'static str {
        match self {
            Language::Python => "//Write your Python code here\ndef main():\n\n",
            Language::Cpp => concat!(
                "// Write your C++ code here\n",
                "#include <iostream>\n",
                "#include <string>\n",
                "using namespace std;\n",
                "\n",
                "int main() {\n",
                "\n",
                "    return 0;\n",
                "}",
            ),
            Language::Java => concat!(
                "// Write your Java code here\n",
                "import java.util.Scanner;\n",
                "\n",
                "public class Main {\n",
                "    public static void main(String[] args) {\n",
                "\n",
                "    }\n",
                "}",
            ),
            Language::Html => concat!(
                "// Write your HTML code here\n",
                "<!DOCTYPE html>\n",
                "<html lang=\"en\">\n",
                "<head>\n",
                "    <meta charset=\"UTF-8\">\n",
                "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
                "    <title></title>\n",
                "</head>\n",
                "<body>\n",
                "   \n",
                "</body>\n",
                "</html>\n",
            ),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(Language::Cpp),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "html" => Ok(Language::Html),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Info,
    Success,
    Input,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Info,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Success,
            text: text.into(),
        }
    }

    fn input(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Input,
            text: text.into(),
        }
    }
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("valid regex")
}

static CPP_INPUT: LazyLock<Regex> = LazyLock::new(|| pattern(r"scanf\s*\(|cin\s*>>"));
static JAVA_INPUT: LazyLock<Regex> = LazyLock::new(|| pattern(r"new\s+Scanner\s*\(|scanner\.next"));
static PYTHON_INPUT: LazyLock<Regex> = LazyLock::new(|| pattern(r"input\s*\("));
static HTML_INPUT: LazyLock<Regex> = LazyLock::new(|| pattern(r"prompt\s*\("));

static COUT: LazyLock<Regex> = LazyLock::new(|| pattern(r"cout\s*<<\s*([^;]+);"));
static PRINTF: LazyLock<Regex> = LazyLock::new(|| pattern(r"printf\s*\(([^)]+)\);"));
static SCANF: LazyLock<Regex> = LazyLock::new(|| pattern(r"scanf\s*\([^)]+\);"));
static CIN: LazyLock<Regex> = LazyLock::new(|| pattern(r"cin\s*>>\s*[^;]+;"));
static PRINTLN: LazyLock<Regex> = LazyLock::new(|| pattern(r"System\.out\.println\s*\(([^)]+)\);"));
static PRINT: LazyLock<Regex> = LazyLock::new(|| pattern(r"System\.out\.print\s*\(([^)]+)\);"));
static SCANNER_READ: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"scanner\.next(?:Line|Int|Double|Float|Long|Short|Byte|Boolean)?\s*\([^)]*\);")
});
static PROMPT: LazyLock<Regex> = LazyLock::new(|| pattern(r"prompt\s*\([^)]*\)"));

/// True when the code reads from standard input (or `prompt()` for HTML).
pub fn has_input_statements(code: &str, language: Language) -> bool {
    let pattern = match language {
        Language::Cpp => &CPP_INPUT,
        Language::Java => &JAVA_INPUT,
        Language::Python => &PYTHON_INPUT,
        Language::Html => &HTML_INPUT,
    };
    pattern.is_match(code)
}

fn strip_quotes(s: &str) -> String {
    s.replace(['"', '\''], "")
}

/// Produces the output-pane lines for `code`. Never fails.
pub fn simulate_run(code: &str, language: Language) -> Vec<OutputLine> {
    let mut lines = match language {
        Language::Python => run_python(code),
        Language::Cpp => run_cpp(code),
        Language::Java => run_java(code),
        Language::Html => run_html(code),
    };
    lines.push(OutputLine::info("--- Execution completed ---"));
    lines
}

fn input_notice(code: &str, language: Language, out: &mut Vec<OutputLine>) -> bool {
    let has_input = has_input_statements(code, language);
    if has_input {
        out.push(OutputLine::info(
            "Interactive input detected - program will request user input",
        ));
    }
    has_input
}

fn run_python(code: &str) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::info("Python execution (simulated):")];
    input_notice(code, Language::Python, &mut out);

    let mut printed = Vec::new();
    for line in code.lines().map(str::trim) {
        if line.starts_with("print(") && line.ends_with(')') {
            printed.push(strip_quotes(&line[6..line.len() - 1]));
        } else if line.contains("input(") {
            out.push(OutputLine::input(format!("Input requested: {}", line)));
        } else if line.contains('=') && !line.contains("==") {
            if let Some((name, value)) = line.split_once('=') {
                out.push(OutputLine::info(format!(
                    "Variable {} assigned: {}",
                    name.trim(),
                    value.trim()
                )));
            }
        } else if ["if ", "for ", "while ", "def "].iter().any(|kw| line.starts_with(kw)) {
            out.push(OutputLine::info(format!("Control structure: {}", line)));
        } else if !line.is_empty() && !line.starts_with('#') {
            out.push(OutputLine::info(format!("Executing: {}", line)));
        }
    }

    if printed.is_empty() {
        out.push(OutputLine::info(
            "Python code parsed successfully. No print statements found.",
        ));
    } else {
        out.extend(printed.into_iter().map(OutputLine::success));
    }
    out
}

fn run_cpp(code: &str) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::info("C++ compilation and execution (simulated):")];

    if !code.contains("#include") {
        out.push(OutputLine::info("Warning: Missing #include directive"));
    }
    if !code.contains("int main()") {
        out.push(OutputLine::info("Warning: Missing main() function"));
    }
    let has_input = input_notice(code, Language::Cpp, &mut out);

    let mut found_output = false;
    for caps in COUT.captures_iter(code).chain(PRINTF.captures_iter(code)) {
        found_output = true;
        out.push(OutputLine::success(format!("Output: {}", strip_quotes(caps[1].trim()))));
    }

    if has_input {
        for _ in SCANF.find_iter(code) {
            out.push(OutputLine::input("Input requested for scanf"));
        }
        for _ in CIN.find_iter(code) {
            out.push(OutputLine::input("Input requested for cin"));
        }
    }

    if !found_output {
        out.push(OutputLine::info(
            "C++ code compiled successfully. No output statements found.",
        ));
    }
    out
}

fn run_java(code: &str) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::info("Java compilation and execution (simulated):")];

    if !code.contains("public class") {
        out.push(OutputLine::info("Warning: Missing public class declaration"));
    }
    if !code.contains("public static void main") {
        out.push(OutputLine::info("Warning: Missing main method"));
    }
    let has_input = input_notice(code, Language::Java, &mut out);

    let mut found_output = false;
    for caps in PRINTLN.captures_iter(code).chain(PRINT.captures_iter(code)) {
        found_output = true;
        out.push(OutputLine::success(format!("Output: {}", strip_quotes(caps[1].trim()))));
    }

    if has_input {
        for read in SCANNER_READ.find_iter(code) {
            out.push(OutputLine::input(format!("Input requested for {}", read.as_str())));
        }
    }

    if !found_output {
        out.push(OutputLine::info(
            "Java code compiled successfully. No output statements found.",
        ));
    }
    out
}

fn run_html(code: &str) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::info("HTML rendering (simulated):")];
    if input_notice(code, Language::Html, &mut out) {
        for _ in PROMPT.find_iter(code) {
            out.push(OutputLine::input("Input requested for prompt()"));
        }
    }
    out.push(OutputLine::success("HTML rendered successfully in preview window."));
    out
}

/// Joins run output into the text written to the output pane.
pub fn render(lines: &[OutputLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
