//! Terminal output for the command line front end.
//!
//! Tool output and progress go to stdout, warnings and errors to stderr.
//! Status markers are colored when the stream is a terminal.

use cyrup_termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, IsTerminal, Write};

/// Writes user-facing messages according to the verbosity flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(io::stdout().is_terminal()))
}

fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(io::stderr().is_terminal()))
}

/// Writes `marker` in `color`, then `message` uncolored.
fn status_line(
    out: &mut impl WriteColor,
    color: Color,
    marker: &str,
    message: &str,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", marker)?;
    out.reset()?;
    writeln!(out, " {}", message)?;
    out.flush()
}

impl OutputManager {
    /// Creates an output manager. `quiet` wins over `verbose`.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose: verbose && !quiet,
            quiet,
        }
    }

    /// Message shown only with `--verbose`.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose {
            let mut out = stdout();
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(out, "  {}", message)?;
            out.reset()?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            let mut out = stdout();
            writeln!(out)?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            writeln!(out, "{}", title)?;
            writeln!(out, "{}", "─".repeat(title.chars().count()))?;
            out.reset()?;
        }
        Ok(())
    }

    /// Indented line, used for tool output.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            let mut out = io::stdout().lock();
            writeln!(out, "  {}", message)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            status_line(&mut stdout(), Color::Green, "✓", message)?;
        }
        Ok(())
    }

    /// Warning line.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            status_line(&mut stderr(), Color::Yellow, "⚠", message)?;
        }
        Ok(())
    }

    /// Error line, shown even when quiet.
    pub fn error(&self, message: &str) -> io::Result<()> {
        status_line(&mut stderr(), Color::Red, "✗", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyrup_termcolor::{Ansi, NoColor};

    #[test]
    fn quiet_overrides_verbose() {
        let output = OutputManager::new(true, true);

        assert!(!output.verbose);
        assert!(output.quiet);
    }

    #[test]
    fn plain_status_line_has_no_escape_codes() {
        let mut out = NoColor::new(Vec::new());

        status_line(&mut out, Color::Green, "✓", "Signed package: sign-app.apk").unwrap();

        assert_eq!(
            String::from_utf8(out.into_inner()).unwrap(),
            "✓ Signed package: sign-app.apk\n"
        );
    }

    #[test]
    fn colored_status_line_keeps_message_plain() {
        let mut out = Ansi::new(Vec::new());

        status_line(&mut out, Color::Red, "✗", "signing failed").unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.ends_with("\x1b[0m signing failed\n"));
    }

    #[test]
    fn colors_only_on_terminals() {
        assert!(matches!(color_choice(false), ColorChoice::Never));
        assert!(matches!(color_choice(true), ColorChoice::Auto));
    }
}
