//! The fixed command table.
//!
//! Every recognized command maps to either a literal response or an action
//! the dispatcher runs. Lookup is case-insensitive; greetings are matched
//! separately and before the table.

/// Informal greetings answered with [`GREETING_RESPONSE`]
pub const GREETINGS: &[&str] = &["hi", "hello", "hey"];

pub const GREETING_RESPONSE: &str = "Hello! I hope you are doing well. Please write 'help' for more options or just ask me a question.";

pub const QUOTES: &[&str] = &[
    "The best way to predict the future is to invent it. - Alan Kay",
    "It's not a bug, it's an undocumented feature.",
    "Programming isn't about what you know; it's about what you can figure out. - Chris Pine",
    "The most dangerous phrase in the language is, 'We've always done it this way.' - Grace Hopper",
];

const HELP: &str = "Available commands:
  about        - Who am I?
  experience   - My work experience.
  projects     - View my recent work.
  socials      - Display contact links.
  location     - Shows my current location.
  whereami     - Get *your* current location.
  quote        - Display a random quote.
  date         - Show the current date and time.
  matrix       - Enter the matrix...
  clear        - Clear the terminal screen.";

const ABOUT: &str = "Hello! I'm Apoorv, a Computer Science student based in New York with a deep passion for turning complex problems into elegant, functional software. I'm currently exploring AI and Quantum Computing.";

const PROJECTS: &str = "My Projects:
1. Voice Assistant Bot (Python)
2. Password Manager (Web)
3. Quantum Learning Portal (Web)
4. Veridium — Web Authentication Service (WIP)
5. Personal Portfolio (this website!)";

const EXPERIENCE: &str = "My Experience:
- API Development Intern @ Pair Bytes (Jun–Aug 2023)
- Research Assistant — Quantum Computing & AI @ Adelphi University (Summer–Fall, Current)";

const SOCIALS: &str = "You can reach me at:
- Email: er.apoorvsingh@gmail.com
- GitHub: https://github.com/apoorvvvv
- LinkedIn: https://www.linkedin.com/in/apoorv-singh-15490a216/";

const LOCATION: &str = "Currently based in New York, USA.";

/// Commands that do more than print a fixed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quote,
    Date,
    Matrix,
    WhereAmI,
    Clear,
}

/// What a command name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEntry {
    Literal(&'static str),
    Action(Action),
}

/// Name to entry
const TABLE: &[(&str, CommandEntry)] = &[
    ("help", CommandEntry::Literal(HELP)),
    ("about", CommandEntry::Literal(ABOUT)),
    ("projects", CommandEntry::Literal(PROJECTS)),
    ("experience", CommandEntry::Literal(EXPERIENCE)),
    ("socials", CommandEntry::Literal(SOCIALS)),
    ("location", CommandEntry::Literal(LOCATION)),
    ("whereami", CommandEntry::Action(Action::WhereAmI)),
    ("quote", CommandEntry::Action(Action::Quote)),
    ("date", CommandEntry::Action(Action::Date)),
    ("matrix", CommandEntry::Action(Action::Matrix)),
    ("clear", CommandEntry::Action(Action::Clear)),
];

/// Look a command up, ignoring case
pub fn lookup(input: &str) -> Option<CommandEntry> {
    TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(input))
        .map(|(_, entry)| *entry)
}

pub fn is_greeting(input: &str) -> bool {
    GREETINGS.iter().any(|g| g.eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> impl Iterator<Item = &'static str> {
        TABLE.iter().map(|(name, _)| *name)
    }

    #[test]
    fn test_table_covers_every_command() {
        let expected = [
            "help", "about", "projects", "experience", "socials", "location", "whereami",
            "quote", "date", "matrix", "clear",
        ];
        let mut names: Vec<_> = names().collect();
        names.sort_unstable();
        let mut expected = expected.to_vec();
        expected.sort_unstable();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_lookup_ignores_case() {
        for name in names() {
            let canonical = lookup(name);
            assert!(canonical.is_some());
            assert_eq!(lookup(&name.to_uppercase()), canonical);
            let mixed: String = name
                .chars()
                .enumerate()
                .map(|(i, c)| if i % 2 == 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            assert_eq!(lookup(&mixed), canonical);
        }
    }

    #[test]
    fn test_lookup_misses() {
        assert_eq!(lookup("banana"), None);
        assert_eq!(lookup("help me"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_greetings() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("HeLLo"));
        assert!(is_greeting("HEY"));
        assert!(!is_greeting("hey there"));
        assert!(lookup("hi").is_none());
    }

    #[test]
    fn test_help_lists_every_other_command() {
        let help = match lookup("help") {
            Some(CommandEntry::Literal(text)) => text,
            other => panic!("help should be literal, got {:?}", other),
        };
        for name in names().filter(|n| *n != "help") {
            assert!(help.contains(name), "help does not mention {}", name);
        }
    }
}
