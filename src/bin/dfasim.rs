use clap::{Arg, ArgAction, Command};
use color_eyre::eyre::{Report, Result};
use dfasim::visualizer::{self, Results};
use dfasim::{
    enumeration_size, parse_alphabet, Alphabet, AutomatonConfig, GeneratedString,
    GenerationSummary, SimulationReport, DFA, FA,
};
use log::{info, warn, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use std::fmt;

/// Default cap on the number of strings `--generate` may enumerate
const DEFAULT_LIMIT: &str = "100000";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[derive(Debug)]
enum CliError {
    EnumerationTooLarge { max_length: usize, limit: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::EnumerationTooLarge { max_length, limit } => write!(
                f,
                "Error: Enumerating strings up to length {} exceeds the limit of {} strings!",
                max_length, limit
            ),
        }
    }
}

impl std::error::Error for CliError {}

#[derive(Serialize)]
struct Run<'a> {
    input: &'a str,
    #[serde(flatten)]
    report: &'a SimulationReport,
}

#[derive(Serialize)]
struct Generated<'a> {
    max_length: usize,
    summary: GenerationSummary,
    strings: &'a [GeneratedString],
}

#[derive(Serialize)]
struct Output<'a> {
    alphabet: &'a Alphabet,
    runs: Vec<Run<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated: Option<Generated<'a>>,
}

fn command() -> Command {
    Command::new("dfasim")
        .version("0.1")
        .about("Build a deterministic finite automaton, trace inputs through it and enumerate the strings it accepts")
        .arg(
            Arg::new("alphabet")
                .short('a')
                .long("alphabet")
                .value_name("SYMBOLS")
                .help("Comma separated list of input symbols, for example 0,1")
                .value_parser(clap::value_parser!(String))
                .num_args(1),
        )
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .value_name("NAME")
                .help("Declare a state. Repeat for every state of the automaton")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .value_name("NAME")
                .help("The start state")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("accept")
                .long("accept")
                .value_name("NAME")
                .help("Mark a state as accepting. Can be repeated")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("transition")
                .short('t')
                .long("transition")
                .value_names(["FROM", "SYMBOL", "TO"])
                .help("Add a transition from one state to another on a symbol of the alphabet")
                .num_args(3)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("STRING")
                .help("Input string to simulate. Can be repeated; an empty string is allowed")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("generate")
                .short('g')
                .long("generate")
                .value_name("MAX LENGTH")
                .help("Test every string over the alphabet up to this length")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("COUNT")
                .help("Refuse to enumerate more than this many strings")
                .default_value(DEFAULT_LIMIT)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-dot")
                .short('d')
                .long("save-dot")
                .value_name("FILE STEM")
                .help("Save the automaton as <FILE STEM>.dot and render it to <FILE STEM>.jpg with Graphviz")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("visualize")
                .short('v')
                .long("visualize")
                .help("Show the automaton and the results inside an interactive window")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Increase logging, repeat for more detail")
                .action(ArgAction::Count),
        )
}

fn read_config(args: &clap::ArgMatches) -> Result<AutomatonConfig> {
    let mut config = AutomatonConfig::new();

    if let Some(alphabet) = args.get_one::<String>("alphabet") {
        config.alphabet = parse_alphabet(alphabet)?;
    }

    if let Some(states) = args.get_many::<String>("state") {
        config.states = states.cloned().collect();
    }

    config.start = args.get_one::<String>("start").cloned();

    if let Some(accept) = args.get_many::<String>("accept") {
        config.accept = accept.cloned().collect();
    }

    if let Some(occurrences) = args.get_occurrences::<String>("transition") {
        for occurrence in occurrences {
            let values: Vec<&String> = occurrence.collect();
            if let [from, symbol, to] = values.as_slice() {
                config
                    .transitions
                    .push((from.to_string(), symbol.to_string(), to.to_string()));
            }
        }
    }

    Ok(config)
}

fn warn_about_structure(dfa: &DFA) {
    if dfa.get_start_state().is_none() {
        warn!("No start state defined, every input will be rejected");
        return;
    }

    let reachable = dfa.reachable_states();
    for index in reachable.iter_zeros() {
        warn!(
            "State {} is unreachable from the start state",
            dfa.states()[index].get_name()
        );
    }

    if !dfa.is_complete() {
        info!("The automaton is partial, some inputs get stuck on a missing transition");
    }
}

fn print_text(dfa: &DFA, results: &Results, max_length: Option<usize>) {
    println!("Alphabet: {}", dfa.alphabet());

    for (input, report) in results.runs.iter() {
        let shown = if input.is_empty() { "ε" } else { input.as_str() };
        let verdict = if report.is_accepted() {
            "ACCEPTED"
        } else {
            "REJECTED"
        };

        match (&report.final_state, &report.error) {
            (_, Some(error)) => println!("{}: {} ({})", shown, verdict, error),
            (Some(state), None) => println!("{}: {} (final state {})", shown, verdict, state),
            (None, None) => println!("{}: {}", shown, verdict),
        }

        for step in report.trace.iter() {
            println!("    {}", step);
        }
    }

    if let Some(max_length) = max_length {
        println!("Strings up to length {}:", max_length);
        for result in results.generated.iter() {
            println!("    {}", result);
        }
        print!("{}", GenerationSummary::from_results(&results.generated));
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = command().get_matches();

    init_logging(args.get_count("verbose"))?;

    let config = read_config(&args)?;
    let dfa = config.build()?;

    warn_about_structure(&dfa);

    let inputs: Vec<String> = args
        .get_many::<String>("input")
        .map(|inputs| inputs.cloned().collect())
        .unwrap_or_default();

    let mut results = Results::default();

    for input in inputs {
        let report = dfa.simulate(&input);
        results.runs.push((input, report));
    }

    let max_length = args.get_one::<usize>("generate").copied();

    if let Some(max_length) = max_length {
        let limit = args.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

        match enumeration_size(dfa.alphabet().len(), max_length) {
            Some(size) if size <= limit => {
                results.generated = dfa.generate_all_strings(max_length);
            }
            _ => {
                let err = Report::new(CliError::EnumerationTooLarge { max_length, limit });
                return Err(err);
            }
        }
    }

    if args.get_flag("json") {
        let output = Output {
            alphabet: dfa.alphabet(),
            runs: results
                .runs
                .iter()
                .map(|(input, report)| Run { input, report })
                .collect(),
            generated: max_length.map(|max_length| Generated {
                max_length,
                summary: GenerationSummary::from_results(&results.generated),
                strings: &results.generated,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&dfa, &results, max_length);
    }

    if let Some(file_stem) = args.get_one::<String>("save-dot") {
        dfa.show_fa(file_stem)?;
    }

    if args.get_flag("visualize") {
        visualizer::visualize(&dfa, &results)?;
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn parse(args: &[&str]) -> clap::ArgMatches {
        command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_read_config() {
        let args = parse(&[
            "dfasim", "-a", "0,1", "-s", "q0", "-s", "q1", "--start", "q0", "--accept", "q1",
            "-t", "q0", "1", "q1", "-t", "q1", "0", "q0",
        ]);

        let config = read_config(&args).unwrap();

        assert_eq!(config.alphabet, vec!["0", "1"]);
        assert_eq!(config.states, vec!["q0", "q1"]);
        assert_eq!(config.start.as_deref(), Some("q0"));
        assert_eq!(config.accept, vec!["q1"]);
        assert_eq!(
            config.transitions,
            vec![
                ("q0".to_string(), "1".to_string(), "q1".to_string()),
                ("q1".to_string(), "0".to_string(), "q0".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_accepted_as_argument() {
        let args = parse(&["dfasim", "-i", "", "-i", "01"]);
        let inputs: Vec<&String> = args.get_many::<String>("input").unwrap().collect();
        assert_eq!(inputs, vec!["", "01"]);
    }

    #[test]
    fn test_limit_default() {
        let args = parse(&["dfasim", "-g", "3"]);
        assert_eq!(args.get_one::<usize>("generate"), Some(&3));
        assert_eq!(args.get_one::<usize>("limit"), Some(&100000));
    }

    #[test]
    fn test_json_output_shape() {
        let args = parse(&[
            "dfasim", "-a", "a", "-s", "p", "--start", "p", "--accept", "p", "-t", "p", "a", "p",
        ]);
        let dfa = read_config(&args).unwrap().build().unwrap();
        let report = dfa.simulate("aa");
        let generated = dfa.generate_all_strings(1);

        let output = Output {
            alphabet: dfa.alphabet(),
            runs: vec![Run {
                input: "aa",
                report: &report,
            }],
            generated: Some(Generated {
                max_length: 1,
                summary: GenerationSummary::from_results(&generated),
                strings: &generated,
            }),
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["alphabet"], serde_json::json!(["a"]));
        assert_eq!(json["runs"][0]["input"], "aa");
        assert_eq!(json["runs"][0]["accepted"], true);
        assert_eq!(json["runs"][0]["final_state"], "p");
        assert_eq!(json["generated"]["summary"]["accepted"], 2);
        assert_eq!(json["generated"]["strings"][0]["string"], "");
    }
}
