use dfasim::{Position, DFA};

fn main() {
    let mut dfa = DFA::new();
    dfa.set_alphabet(["0", "1"]);

    let even = dfa.add_state(Position::new(100.0, 100.0), Some("even"));
    let odd = dfa.add_state(Position::new(250.0, 100.0), Some("odd"));

    dfa.set_start_state(Some(even));
    dfa.set_accept(even, true);

    dfa.add_transition(even, odd, "1");
    dfa.add_transition(odd, even, "1");
    dfa.add_transition(even, even, "0");
    dfa.add_transition(odd, odd, "0");

    for input in ["", "1", "11", "0110", "10101", "012"] {
        let report = dfa.simulate(input);

        println!(
            "The input {:?} is {}",
            input,
            if report.is_accepted() {
                "accepted"
            } else {
                "rejected"
            }
        );

        for step in report.trace.iter() {
            println!("    {}", step);
        }

        if let Some(error) = report.error {
            println!("    {}", error);
        }
    }
}
