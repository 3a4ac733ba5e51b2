use dfasim::{parse_alphabet, AutomatonConfig, GenerationSummary};

fn main() {
    let mut config = AutomatonConfig::new();

    config.alphabet = parse_alphabet("a, b").unwrap();
    config.states = vec!["q0".to_string(), "q1".to_string(), "q2".to_string()];
    config.start = Some("q0".to_string());
    config.accept = vec!["q2".to_string()];

    // Strings containing "ab"
    for (from, symbol, to) in [
        ("q0", "a", "q1"),
        ("q0", "b", "q0"),
        ("q1", "a", "q1"),
        ("q1", "b", "q2"),
        ("q2", "a", "q2"),
        ("q2", "b", "q2"),
    ] {
        config
            .transitions
            .push((from.to_string(), symbol.to_string(), to.to_string()));
    }

    let dfa = config.build().unwrap();

    let results = dfa.generate_all_strings(4);

    for result in results.iter().filter(|result| result.accepted) {
        println!("{}", result.display_string());
    }

    println!("{}", GenerationSummary::from_results(&results));
}
