use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use std::{
    io::{self, stdin, Write},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use linguaflow::ai::{GeminiClient, Tutor};
use linguaflow::config::Config;
use linguaflow::hard_words::{HardWords, JsonFileStore};
use linguaflow::session::StudySession;
use linguaflow::source::{BundledSource, FileSource, HttpSource};
use linguaflow::{load_parts, LinguaError, Part, Stats, WordSource};

type Hard = HardWords<JsonFileStore>;

#[derive(Parser, Debug)]
#[command(about = "Vocabulary flashcards from a published spreadsheet")]
struct Args {
    /// CSV export URL, overriding the configured one
    #[arg(short, long)]
    url: Option<String>,
    /// Read the sheet from a local CSV file
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,
    /// Use the bundled sample sheet
    #[arg(long, conflicts_with_all = ["url", "file"])]
    sample: bool,
    /// List parts and exit
    #[arg(short, long, default_value = "false")]
    list: bool,
    /// Start studying this part directly
    #[arg(short, long)]
    part: Option<String>,
    /// Study the words marked as hard
    #[arg(long, conflicts_with = "part")]
    hard: bool,
    /// Shuffle the deck
    #[arg(long)]
    shuffle: bool,
    /// Write the effective config (including --url) to the config file and exit
    #[arg(long)]
    save_config: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

enum Commands {
    Next,
    Prev,
    Flip,
    Known,
    Hard,
    Mark,
    Context,
    Sentence(String),
    Answer(String),
    Help,
    Back,
    Quit,
}

impl Commands {
    fn help() {
        println!("Available commands:");
        println!("  <enter>      - Next card");
        println!("  \\p           - Previous card");
        println!("  \\f           - Flip the card");
        println!("  \\k           - I knew it: unmark as hard, next card");
        println!("  \\d           - I struggled: mark as hard, next card");
        println!("  \\m           - Mark or unmark the word as hard");
        println!("  \\c           - Definition and example sentence (AI)");
        println!("  \\s <text>    - Check your own sentence with this word (AI)");
        println!("  \\b           - Back to the part list");
        println!("  \\q           - Quit");
        println!("  <answer>     - Guess the translation");
    }
}

impl FromStr for Commands {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "\\n" => Ok(Commands::Next),
            "\\p" => Ok(Commands::Prev),
            "\\f" => Ok(Commands::Flip),
            "\\k" => Ok(Commands::Known),
            "\\d" => Ok(Commands::Hard),
            "\\m" => Ok(Commands::Mark),
            "\\c" => Ok(Commands::Context),
            "\\h" => Ok(Commands::Help),
            "\\b" => Ok(Commands::Back),
            "\\q" => Ok(Commands::Quit),
            _ if s.starts_with("\\s") => {
                let sentence = s["\\s".len()..].trim();
                if sentence.is_empty() {
                    Err("\\s needs a sentence".to_string())
                } else {
                    Ok(Commands::Sentence(sentence.to_string()))
                }
            }
            _ if s.starts_with('\\') => Err("Unknown command".to_string()),
            _ => Ok(Commands::Answer(s.to_string())),
        }
    }
}

enum Exit {
    Home,
    Quit,
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    let read = stdin()
        .read_line(&mut input)
        .context("Failed to read line from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn load_with_retry(source: &dyn WordSource) -> Result<Vec<Part>> {
    loop {
        match load_parts(source) {
            Ok(parts) => return Ok(parts),
            Err(e @ LinguaError::DataUnavailable(_)) => {
                eprintln!("Could not load words: {}", e);
                match prompt("Retry? [y/N] ")? {
                    Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
                    _ => bail!(e),
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_home(parts: &[Part], hard: &Hard) {
    let stats = Stats::collect(parts, hard.len());
    println!(
        "\n{} parts, {} words, {} hard",
        stats.parts, stats.words, stats.hard_words
    );
    for (i, part) in parts.iter().enumerate() {
        println!("  {:>2}. {} ({} words)", i + 1, part.name, part.words.len());
    }
}

fn print_card(session: &StudySession, hard: &Hard, flipped: bool) {
    let Some(word) = session.current() else {
        return;
    };
    let (pos, total) = session.position();
    let mark = if hard.contains(&word.id) { " [hard]" } else { "" };

    println!("\n{} {}/{}{}", session.title(), pos, total, mark);
    if flipped {
        println!("{} = {}", word.source_text, word.target_text);
    } else {
        println!("{}", word.source_text);
    }
}

fn run_session(
    session: &mut StudySession,
    hard: &mut Hard,
    tutor: Option<&Tutor<GeminiClient>>,
) -> Result<Exit> {
    if session.is_empty() {
        println!("This part has no words.");
        return Ok(Exit::Home);
    }

    let mut flipped = false;
    loop {
        print_card(session, hard, flipped);
        let Some(input) = prompt("|> ")? else {
            break Ok(Exit::Quit);
        };
        let Some(word) = session.current().cloned() else {
            break Ok(Exit::Home);
        };

        match Commands::from_str(&input) {
            Ok(Commands::Next) => {
                if !session.next() {
                    println!("End of deck. \\b returns to the part list.");
                }
                flipped = false;
            }
            Ok(Commands::Prev) => {
                session.prev();
                flipped = false;
            }
            Ok(Commands::Flip) => flipped = !flipped,
            Ok(Commands::Known) => {
                if !session.mark_known(hard).context("Failed to save hard words")? {
                    println!("Last card. \\b returns to the part list.");
                }
                flipped = false;
            }
            Ok(Commands::Hard) => {
                if !session.mark_hard(hard).context("Failed to save hard words")? {
                    println!("Marked as hard. Last card, \\b returns to the part list.");
                }
                flipped = false;
            }
            Ok(Commands::Mark) => {
                if hard.toggle(&word.id).context("Failed to save hard words")? {
                    println!("Marked as hard.");
                } else {
                    println!("No longer marked as hard.");
                }
            }
            Ok(Commands::Context) => match tutor {
                Some(tutor) => {
                    let ctx = tutor.generate_word_context(&word);
                    println!("{}", ctx.definition);
                    println!("  {}", ctx.sentence);
                    println!("  {}", ctx.translation);
                }
                None => println!("{}", LinguaError::MissingApiKey),
            },
            Ok(Commands::Sentence(sentence)) => match tutor {
                Some(tutor) => {
                    let check = tutor.validate_user_sentence(&word.source_text, &sentence);
                    let verdict = if check.is_correct { "Correct!" } else { "Not quite." };
                    println!("{} {}", verdict, check.feedback);
                    if let Some(correction) = check.correction {
                        println!("  {}", correction);
                    }
                }
                None => println!("{}", LinguaError::MissingApiKey),
            },
            Ok(Commands::Answer(answer)) => {
                if answer.trim().to_lowercase() == word.target_text.to_lowercase() {
                    println!("Correct!");
                } else {
                    println!("Incorrect. The correct answer is: {}", word.target_text);
                }
                flipped = true;
            }
            Ok(Commands::Help) => Commands::help(),
            Ok(Commands::Back) => break Ok(Exit::Home),
            Ok(Commands::Quit) => {
                println!("Quitting...");
                break Ok(Exit::Quit);
            }
            Err(e) => eprintln!("Invalid command: {}. Type \\h for help.", e),
        }
    }
}

fn start(
    mut session: StudySession,
    shuffle: bool,
    hard: &mut Hard,
    tutor: Option<&Tutor<GeminiClient>>,
) -> Result<Exit> {
    if shuffle {
        session.shuffle(&mut rand::rng());
    }
    println!("Type '\\h' for commands.");
    let exit = run_session(&mut session, hard, tutor)?;
    session.go_home();
    Ok(exit)
}

fn home_loop(
    parts: &[Part],
    hard: &mut Hard,
    tutor: Option<&Tutor<GeminiClient>>,
    shuffle: bool,
) -> Result<()> {
    loop {
        print_home(parts, hard);
        let Some(choice) = prompt("Part number, 'h' for hard words, 'q' to quit: ")? else {
            return Ok(());
        };

        let session = match choice.as_str() {
            "q" => return Ok(()),
            "h" => match StudySession::start_difficult(parts, hard) {
                Some(session) => session,
                None => {
                    println!("No hard words yet.");
                    continue;
                }
            },
            n => match n.parse::<usize>().ok().and_then(|i| parts.get(i.wrapping_sub(1))) {
                Some(part) => StudySession::start_part(part),
                None => {
                    println!("No such part: {}", n);
                    continue;
                }
            },
        };

        if let Exit::Quit = start(session, shuffle, hard, tutor)? {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose > 0 { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(url) = &args.url {
        config.csv_url = url.clone();
    }

    if args.save_config {
        let path = Config::config_path()?;
        config
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved config to {}", path.display());
        return Ok(());
    }

    let source: Box<dyn WordSource> = if args.sample {
        Box::new(BundledSource)
    } else if let Some(path) = &args.file {
        Box::new(FileSource::new(path))
    } else {
        Box::new(HttpSource::new(
            config.csv_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?)
    };

    let parts = load_with_retry(source.as_ref())?;

    if args.list {
        for part in &parts {
            println!("{} ({} words)", part.name, part.words.len());
        }
        return Ok(());
    }

    let store_path = Config::hard_words_path().context("Failed to locate data directory")?;
    let mut hard = HardWords::load(JsonFileStore::new(store_path));

    let tutor = match GeminiClient::from_config(&config) {
        Ok(client) => Some(Tutor::new(
            client,
            config.source_language.clone(),
            config.target_language.clone(),
        )),
        Err(e) => {
            debug!(error = %e, "AI commands disabled");
            None
        }
    };

    if args.hard {
        match StudySession::start_difficult(&parts, &hard) {
            Some(session) => {
                start(session, args.shuffle, &mut hard, tutor.as_ref())?;
            }
            None => println!("No hard words yet."),
        }
        return Ok(());
    }

    if let Some(name) = &args.part {
        let Some(part) = parts.iter().find(|p| p.name.eq_ignore_ascii_case(name)) else {
            let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
            bail!("Part '{}' not found. Available: {}", name, names.join(", "));
        };
        start(
            StudySession::start_part(part),
            args.shuffle,
            &mut hard,
            tutor.as_ref(),
        )?;
        return Ok(());
    }

    home_loop(&parts, &mut hard, tutor.as_ref(), args.shuffle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_commands_parse() {
        assert!(matches!(Commands::from_str("\\k"), Ok(Commands::Known)));
        assert!(matches!(Commands::from_str("\\d"), Ok(Commands::Hard)));
        assert!(matches!(Commands::from_str(""), Ok(Commands::Next)));
    }

    #[test]
    fn sentence_command_needs_text() {
        assert!(Commands::from_str("\\s").is_err());
        assert!(matches!(
            Commands::from_str("\\s I eat an apple."),
            Ok(Commands::Sentence(s)) if s == "I eat an apple."
        ));
        assert!(matches!(Commands::from_str("\\x"), Err(_)));
        assert!(matches!(Commands::from_str("elma"), Ok(Commands::Answer(_))));
    }
}
