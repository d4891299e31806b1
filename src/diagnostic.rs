use owo_colors::OwoColorize;

/// A source span representing a range of bytes in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// Style for diagnostic labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A label pointing to a specific span in the source
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

/// A fatal error report: message, optional code, source labels and notes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(format!("note: {}", note.into()));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// Computes line and column from a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Returns the text of a 1-based line, without its terminator.
fn line_text(source: &str, line_num: usize) -> Option<&str> {
    source
        .split('\n')
        .nth(line_num.checked_sub(1)?)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Renders diagnostics in the rustc style:
///
/// ```text
/// error[E0201]: undefined variable `y`
///   --> main.macs:3:7
///    |
///  3 | print(y);
///    |       ^ not found in any enclosing scope
///    |
/// ```
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        self.render_header(&mut output, diagnostic);

        let mut lines_to_show: Vec<usize> = Vec::new();
        for label in diagnostic.labels.iter().filter(|l| !l.span.is_dummy()) {
            let (start_line, _) = line_col(self.source, label.span.start);
            let (end_line, _) = line_col(self.source, self.last_offset(label.span));
            for line in start_line..=end_line {
                if !lines_to_show.contains(&line) {
                    lines_to_show.push(line);
                }
            }
        }
        lines_to_show.sort_unstable();

        if let Some(&max_line) = lines_to_show.last() {
            if let Some(label) = diagnostic.labels.iter().find(|l| !l.span.is_dummy()) {
                let (line, col) = line_col(self.source, label.span.start);
                output.push_str(&format!(
                    "  {} {}:{}:{}\n",
                    self.blue("-->"),
                    self.file_name,
                    line,
                    col
                ));
            }

            let width = max_line.to_string().len();
            let gutter = format!("{} {}\n", " ".repeat(width + 1), self.blue("|"));

            output.push_str(&gutter);
            for &line_num in &lines_to_show {
                self.render_line(&mut output, diagnostic, line_num, width);
            }
            output.push_str(&gutter);
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.blue("="), note));
        }

        output
    }

    fn last_offset(&self, span: Span) -> usize {
        span.end.saturating_sub(1).max(span.start)
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = self.red_bold("error");
        match &diagnostic.code {
            Some(code) => output.push_str(&format!(
                "{}{}: {}\n",
                severity,
                self.red_bold(&format!("[{}]", code)),
                self.bold(&diagnostic.message)
            )),
            None => output.push_str(&format!("{}: {}\n", severity, self.bold(&diagnostic.message))),
        }
    }

    fn render_line(&self, output: &mut String, diagnostic: &Diagnostic, line_num: usize, width: usize) {
        let Some(content) = line_text(self.source, line_num) else {
            return;
        };

        output.push_str(&format!(
            "{} {} {}\n",
            self.blue(&format!("{:>width$}", line_num, width = width + 1)),
            self.blue("|"),
            content
        ));

        let mut underlines: Vec<(usize, usize, &str, LabelStyle)> = Vec::new();
        for label in diagnostic.labels.iter().filter(|l| !l.span.is_dummy()) {
            let (first_line, start_col) = line_col(self.source, label.span.start);
            let (last_line, end_col) = line_col(self.source, self.last_offset(label.span));

            if first_line <= line_num && last_line >= line_num {
                let col_start = if first_line == line_num { start_col } else { 1 };
                let col_end = if last_line == line_num {
                    end_col + 1
                } else {
                    content.chars().count() + 1
                };
                underlines.push((col_start, col_end, &label.message, label.style));
            }
        }

        if underlines.is_empty() {
            return;
        }
        underlines.sort_by_key(|(start, _, _, _)| *start);

        let mut marks = String::new();
        let mut pos = 1;
        for (col_start, col_end, _, style) in &underlines {
            while pos < *col_start {
                marks.push(' ');
                pos += 1;
            }
            let mark = match style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            while pos < *col_end {
                marks.push(mark);
                pos += 1;
            }
        }

        let marks = if underlines.iter().any(|(_, _, _, s)| *s == LabelStyle::Primary) {
            self.red(&marks)
        } else {
            self.blue(&marks)
        };
        output.push_str(&format!("{} {} {}\n", " ".repeat(width + 1), self.blue("|"), marks));

        for (col_start, _, message, style) in &underlines {
            if message.is_empty() {
                continue;
            }
            let padding = " ".repeat(col_start.saturating_sub(1));
            let message = match style {
                LabelStyle::Primary => self.red(message),
                LabelStyle::Secondary => self.blue(message),
            };
            output.push_str(&format!(
                "{} {} {}{}\n",
                " ".repeat(width + 1),
                self.blue("|"),
                padding,
                message
            ));
        }
    }

    fn red(&self, s: &str) -> String {
        if self.use_color { s.red().to_string() } else { s.to_string() }
    }

    fn red_bold(&self, s: &str) -> String {
        if self.use_color { s.red().bold().to_string() } else { s.to_string() }
    }

    fn blue(&self, s: &str) -> String {
        if self.use_color { s.blue().to_string() } else { s.to_string() }
    }

    fn bold(&self, s: &str) -> String {
        if self.use_color { s.bold().to_string() } else { s.to_string() }
    }
}

/// Render multiple diagnostics followed by an abort summary line.
pub fn render_diagnostics(source: &str, file_name: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    match diagnostics.len() {
        0 => {}
        1 => output.push_str("error: aborting due to 1 previous error\n"),
        n => output.push_str(&format!("error: aborting due to {} previous errors\n", n)),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "var x: int = 5;\nprint(x);";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 4), (1, 5));
        assert_eq!(line_col(source, 16), (2, 1));
        assert_eq!(line_col(source, 22), (2, 7));
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
    }

    #[test]
    fn test_diagnostic_rendering() {
        let source = "var x: int = 1;\nprint(y);\n";
        let diagnostic = Diagnostic::error("undefined variable `y`")
            .with_code("E0201")
            .with_label(Label::primary(Span::new(22, 23), "not found in any enclosing scope"))
            .with_help("declare it first with `var y: int;`");

        let output = DiagnosticRenderer::new(source, "main.macs", false).render(&diagnostic);

        assert!(output.starts_with("error[E0201]: undefined variable `y`"));
        assert!(output.contains("main.macs:2:7"));
        assert!(output.contains(" 2 | print(y);"));
        assert!(output.contains("|       ^\n"));
        assert!(output.contains("|       not found in any enclosing scope\n"));
        assert!(output.contains("= help: declare it first"));
    }

    #[test]
    fn test_dummy_span_renders_header_only() {
        let diagnostic = Diagnostic::error("boom").with_label(Label::primary(Span::dummy(), ""));
        let output = DiagnosticRenderer::new("print(1);", "main.macs", false).render(&diagnostic);
        assert_eq!(output, "error: boom\n");
    }

    #[test]
    fn test_summary_line() {
        let output = render_diagnostics("", "main.macs", &[Diagnostic::error("boom")], false);
        assert!(output.ends_with("error: aborting due to 1 previous error\n"));
    }
}
