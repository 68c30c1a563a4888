/// Blocking prompts: dialoguer on an attended terminal, plain lines otherwise
use std::io::{BufRead, BufReader, Write};
use std::sync::Mutex;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::debug;

use crate::error::InstallError;

/// Encoded affirmative answer of a yes/no prompt
pub const YES: usize = 1;
/// Encoded negative answer of a yes/no prompt
pub const NO: usize = 0;

/// How an answer is read and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `y`/`yes` is affirmative, anything else negative; never re-prompts
    YesNo,
    /// Index into the choice list; re-prompts until valid
    Choice,
}

/// A question to put to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub message: String,
    pub choices: Vec<String>,
    pub kind: PromptKind,
}

impl PromptSpec {
    pub fn yes_no(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            choices: Vec::new(),
            kind: PromptKind::YesNo,
        }
    }

    pub fn choice<I, S>(message: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: message.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            kind: PromptKind::Choice,
        }
    }
}

/// Source of user answers
///
/// Implementations block on user input; async callers go through
/// `Dependencies::confirm` and `Dependencies::choose`.
pub trait Prompter: Send + Sync {
    /// Ask and return the encoded answer (`YES`/`NO`, or the chosen index)
    fn ask(&self, spec: &PromptSpec) -> Result<usize, InstallError>;

    /// Ask a yes/no question
    fn confirm(&self, message: &str) -> Result<bool, InstallError> {
        Ok(self.ask(&PromptSpec::yes_no(message))? == YES)
    }

    /// Ask the user to pick one of `choices`
    fn choose(&self, message: &str, choices: &[&str]) -> Result<usize, InstallError> {
        self.ask(&PromptSpec::choice(message, choices.iter().copied()))
    }
}

/// Interpret one line of input as a yes/no answer
pub fn parse_yes_no(input: &str) -> usize {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => YES,
        _ => NO,
    }
}

/// Interpret one line of input as an index below `count`
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|index| *index < count)
}

/// Input validator for an indexed choice among `count` entries
pub fn validate_choice(input: &str, count: usize) -> Result<(), String> {
    parse_choice(input, count)
        .map(|_| ())
        .ok_or_else(|| format!("Enter a number between 0 and {}", count.saturating_sub(1)))
}

fn choice_prompt(count: usize) -> String {
    format!("Your choice (0 - {})", count.saturating_sub(1))
}

fn menu(spec: &PromptSpec) -> String {
    let mut text = format!("  {}\n", spec.message);
    for (i, choice) in spec.choices.iter().enumerate() {
        text.push_str(&format!("\n    {} {}", style(format!("{})", i)).cyan(), choice));
    }
    text.push('\n');
    text
}

/// Prompter driving dialoguer inputs on an attended terminal
pub struct TermPrompter {
    term: Term,
    theme: ColorfulTheme,
}

impl TermPrompter {
    pub fn new(term: Term) -> Self {
        Self {
            term,
            theme: ColorfulTheme::default(),
        }
    }

    /// Whether stdin and stderr are both attended by a user
    pub fn is_available() -> bool {
        use std::io::IsTerminal;

        std::io::stdin().is_terminal() && Term::stderr().features().is_attended()
    }
}

impl Prompter for TermPrompter {
    fn ask(&self, spec: &PromptSpec) -> Result<usize, InstallError> {
        match spec.kind {
            PromptKind::YesNo => {
                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(spec.message.as_str())
                    .allow_empty(true)
                    .interact_text_on(&self.term)?;
                Ok(parse_yes_no(&answer))
            }
            PromptKind::Choice => {
                let count = spec.choices.len();
                self.term.write_line(&menu(spec))?;

                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(choice_prompt(count))
                    .validate_with(move |input: &String| validate_choice(input, count))
                    .interact_text_on(&self.term)?;
                parse_choice(&answer, count).ok_or(InstallError::PromptClosed)
            }
        }
    }
}

/// Prompter reading answers line by line from `R` and rendering to `W`
pub struct LinePrompter<R, W> {
    io: Mutex<(R, W)>,
}

impl LinePrompter<BufReader<std::io::Stdin>, std::io::Stdout> {
    /// Prompter bound to the process stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Consume the prompter and hand back the writer
    #[cfg(test)]
    pub fn into_writer(self) -> W {
        let (_, writer) = self.io.into_inner().unwrap_or_else(|e| e.into_inner());
        writer
    }

    fn render(writer: &mut W, spec: &PromptSpec) -> std::io::Result<()> {
        match spec.kind {
            PromptKind::YesNo => write!(writer, "  {} ", spec.message)?,
            PromptKind::Choice => write!(
                writer,
                "{}\n  {}: ",
                menu(spec),
                choice_prompt(spec.choices.len())
            )?,
        }
        writer.flush()
    }
}

impl<R, W> Prompter for LinePrompter<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn ask(&self, spec: &PromptSpec) -> Result<usize, InstallError> {
        let mut guard = self.io.lock().unwrap_or_else(|e| e.into_inner());
        let (reader, writer) = &mut *guard;

        loop {
            Self::render(writer, spec)?;

            // Undecodable bytes become replacement characters, never an error
            let mut raw = Vec::new();
            let read = reader.read_until(b'\n', &mut raw)?;
            let line = String::from_utf8_lossy(&raw);

            match spec.kind {
                PromptKind::YesNo => return Ok(parse_yes_no(&line)),
                PromptKind::Choice => {
                    if let Some(index) = parse_choice(&line, spec.choices.len()) {
                        return Ok(index);
                    }
                    if read == 0 {
                        return Err(InstallError::PromptClosed);
                    }
                    debug!("Rejected choice input {:?}", line.trim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_yes_no_affirmative_inputs() {
        for input in ["y", "Y", "yes", "YES", " yes "] {
            assert_eq!(parse_yes_no(input), YES, "input {:?}", input);
        }
    }

    #[test]
    fn test_yes_no_everything_else_is_negative() {
        for input in ["", "n", "no", "yeah", "1", "  "] {
            assert_eq!(parse_yes_no(input), NO, "input {:?}", input);
        }
    }

    #[test]
    fn test_yes_no_reads_a_single_line() {
        let p = prompter("garbage\nyes\n");
        assert!(!p.confirm("Install?").unwrap());

        let output = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(output.matches("Install?").count(), 1);
    }

    #[test]
    fn test_yes_no_at_end_of_input_is_negative() {
        let p = prompter("");
        assert!(!p.confirm("Install?").unwrap());
    }

    #[test]
    fn test_choice_accepts_valid_indices() {
        let p = prompter("0\n");
        assert_eq!(p.choose("Pick", &["a", "b"]).unwrap(), 0);

        let p = prompter("1\n");
        assert_eq!(p.choose("Pick", &["a", "b"]).unwrap(), 1);
    }

    #[test]
    fn test_choice_reprompts_on_invalid_input() {
        let p = prompter("2\n-1\nabc\n\n1\n");
        assert_eq!(p.choose("Pick", &["a", "b"]).unwrap(), 1);

        let output = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(output.matches("Your choice (0 - 1):").count(), 5);
    }

    #[test]
    fn test_choice_lists_options() {
        let p = prompter("0\n");
        p.choose("What now?", &["Install a local cluster", "Connect"])
            .unwrap();

        let output = String::from_utf8(p.into_writer()).unwrap();
        assert!(output.contains("What now?"));
        assert!(output.contains("Install a local cluster"));
        assert!(output.contains("Connect"));
    }

    #[test]
    fn test_choice_fails_when_input_closes() {
        let p = prompter("abc\n");
        let result = p.choose("Pick", &["a", "b"]);
        assert!(matches!(result, Err(InstallError::PromptClosed)));
    }

    #[test]
    fn test_yes_no_with_invalid_utf8_is_negative() {
        let p = LinePrompter::new(Cursor::new(vec![0xff, 0xfe, b'\n']), Vec::new());
        assert!(!p.confirm("Install?").unwrap());
    }

    #[test]
    fn test_choice_reprompts_after_invalid_utf8() {
        let mut input = vec![0xff, 0xfe, b'\n'];
        input.extend_from_slice(b"1\n");
        let p = LinePrompter::new(Cursor::new(input), Vec::new());

        assert_eq!(p.choose("Pick", &["a", "b"]).unwrap(), 1);

        let output = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(output.matches("Your choice (0 - 1):").count(), 2);
    }

    #[test]
    fn test_validate_choice_messages() {
        assert!(validate_choice("0", 2).is_ok());
        assert!(validate_choice(" 1\n", 2).is_ok());
        assert_eq!(
            validate_choice("7", 2).unwrap_err(),
            "Enter a number between 0 and 1"
        );
        assert!(validate_choice("abc", 3).is_err());
    }

    #[test]
    fn test_menu_numbers_choices_from_zero() {
        let text = console::strip_ansi_codes(&menu(&PromptSpec::choice(
            "What now?",
            ["Install a local cluster", "Connect"],
        )))
        .to_string();

        assert!(text.starts_with("  What now?\n"));
        assert!(text.contains("\n    0) Install a local cluster"));
        assert!(text.contains("\n    1) Connect"));
    }

    #[test]
    fn test_parse_choice_bounds() {
        assert_eq!(parse_choice(" 1 ", 2), Some(1));
        assert_eq!(parse_choice("2", 2), None);
        assert_eq!(parse_choice("-1", 2), None);
        assert_eq!(parse_choice("0", 0), None);
    }
}
